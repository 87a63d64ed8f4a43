//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, post, test as actix_test, web};
use serde_json::Value;

use crate::domain::ports::{
    MockAchievementCommand, MockAchievementQuery, MockAuthCommand, MockTagCommand, MockTagQuery,
    MockTaskCommand, MockTaskQuery, MockUserProfileCommand, MockUserProfileQuery,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, configure_api};

pub(crate) const SESSION_COOKIE: &str = "session";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by a response, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
}

/// Mock ports for handler tests; unset expectations fail loudly.
#[derive(Default)]
pub struct MockPorts {
    pub auth: MockAuthCommand,
    pub profile: MockUserProfileQuery,
    pub profile_command: MockUserProfileCommand,
    pub tasks: MockTaskCommand,
    pub tasks_query: MockTaskQuery,
    pub tags: MockTagCommand,
    pub tags_query: MockTagQuery,
    pub achievements: MockAchievementCommand,
    pub achievements_query: MockAchievementQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            auth: Arc::new(self.auth),
            profile: Arc::new(self.profile),
            profile_command: Arc::new(self.profile_command),
            tasks: Arc::new(self.tasks),
            tasks_query: Arc::new(self.tasks_query),
            tags: Arc::new(self.tags),
            tags_query: Arc::new(self.tags_query),
            achievements: Arc::new(self.achievements),
            achievements_query: Arc::new(self.achievements_query),
        }
    }
}

const SIGN_IN_PATH: &str = "/test/sign-in";

#[post("/test/sign-in/{user_id}")]
async fn sign_in_as(session: SessionContext, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user_id =
        UserId::new(path.into_inner()).map_err(|error| Error::invalid_request(error.to_string()))?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// The full API under `/api/v1`, backed by mocks, plus a sign-in shortcut.
pub fn test_app(
    ports: MockPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .wrap(test_session_middleware())
        .service(sign_in_as)
        .service(web::scope("/api/v1").configure(configure_api))
}

/// Obtain a session cookie for `user_id` without going through login.
pub async fn sign_in<S>(app: &S, user_id: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri(&format!("{SIGN_IN_PATH}/{user_id}"))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    session_cookie(&response).expect("sign-in sets a session cookie")
}

/// Decode a JSON response body.
pub async fn json_body(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON response body")
}

/// `details.field` of an error body.
pub fn error_field(body: &Value) -> Option<&str> {
    body.get("details")
        .and_then(|details| details.get("field"))
        .and_then(Value::as_str)
}
