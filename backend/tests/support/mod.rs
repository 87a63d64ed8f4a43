//! Full-stack harness: real services over the in-memory store, driven
//! through the `/api/v1` routes with a controllable clock.

use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use questlog::domain::ports::{PasswordHashError, PasswordHasher};
use questlog::inbound::http::configure_api;
use questlog::inbound::http::state::{Adapters, HttpState};
use questlog::outbound::memory::MemoryStore;

pub const PASSWORD: &str = "correct horse battery";

/// Clock that only moves when a test advances it.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.0.lock().expect("clock lock") += delta;
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

/// Reversible stand-in for Argon2 so tests stay fast in debug builds.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
        stored_hash
            .strip_prefix("plain$")
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordHashError::malformed("missing plain$ prefix"))
    }
}

/// `2026-03-04`, a Wednesday, at `hour` UTC.
pub fn wednesday_at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, hour, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// Services over a fresh memory store.
pub fn memory_state(clock: Arc<TestClock>, hasher: Arc<dyn PasswordHasher>) -> HttpState {
    let store = Arc::new(MemoryStore::new());
    HttpState::from_adapters(Adapters {
        users: Arc::clone(&store),
        ledger: Arc::clone(&store),
        tasks: Arc::clone(&store),
        tags: Arc::clone(&store),
        achievements: store,
        hasher,
        clock,
    })
}

/// The API mounted the way the server mounts it, with insecure cookies.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api/v1").wrap(session).configure(configure_api))
}

/// Status and decoded body of one call.
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<Cookie<'static>>,
}

/// Send `method path` with an optional JSON body and session cookie.
pub async fn call<S>(
    app: &S,
    method: &str,
    path: &str,
    body: Option<Value>,
    cookie: Option<&Cookie<'static>>,
) -> Reply
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut request = match method {
        "GET" => test::TestRequest::get(),
        "POST" => test::TestRequest::post(),
        "PUT" => test::TestRequest::put(),
        "DELETE" => test::TestRequest::delete(),
        other => panic!("unsupported method {other}"),
    }
    .uri(path);
    if let Some(body) = body {
        request = request.set_json(body);
    }
    if let Some(cookie) = cookie {
        request = request.cookie(cookie.clone());
    }
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned);
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON response body")
    };
    Reply {
        status,
        body,
        cookie,
    }
}

/// Register `username` and return the session cookie.
pub async fn register<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let reply = call(
        app,
        "POST",
        "/api/v1/auth/register",
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
        })),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "register {username}: {}", reply.body);
    reply.cookie.expect("registration sets a session cookie")
}

/// Create a task and return its id.
pub async fn create_task<S>(app: &S, cookie: &Cookie<'static>, body: Value) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let reply = call(app, "POST", "/api/v1/tasks", Some(body), Some(cookie)).await;
    assert_eq!(reply.status, StatusCode::CREATED, "create task: {}", reply.body);
    reply
        .body
        .get("id")
        .and_then(Value::as_str)
        .expect("task id")
        .to_owned()
}
