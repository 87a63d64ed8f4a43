//! Registration, login, and session endpoints.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"quest_hero","email":"hero@example.com","password":"..."}
//! POST /api/v1/auth/login {"email":"hero@example.com","password":"..."}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::{LoginResponse, RegisterResponse, UserProfile};
use crate::domain::{AuthValidationError, Error, LoginCredentials, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ErrorSchema, LoginResponseSchema, RegisterResponseSchema, UserProfileSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, missing_field_error};

/// Request body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "quest_hero")]
    pub username: Option<String>,
    #[schema(example = "hero@example.com")]
    pub email: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "hero@example.com")]
    pub email: Option<String>,
    #[schema(format = Password)]
    pub password: Option<String>,
}

fn map_auth_validation_error(error: AuthValidationError) -> Error {
    invalid_field_error(error.field(), error)
}

fn parse_register_request(payload: RegisterRequest) -> Result<Registration, Error> {
    let username = payload
        .username
        .ok_or_else(|| missing_field_error("username"))?;
    let email = payload.email.ok_or_else(|| missing_field_error("email"))?;
    let password = Zeroizing::new(
        payload
            .password
            .ok_or_else(|| missing_field_error("password"))?,
    );
    Registration::try_from_parts(&username, &email, &password).map_err(map_auth_validation_error)
}

fn parse_login_request(payload: LoginRequest) -> Result<LoginCredentials, Error> {
    let email = payload.email.ok_or_else(|| missing_field_error("email"))?;
    let password = Zeroizing::new(
        payload
            .password
            .ok_or_else(|| missing_field_error("password"))?,
    );
    LoginCredentials::try_from_parts(&email, &password).map_err(map_auth_validation_error)
}

/// Create an account, award the registration bonus, and sign in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponseSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username or email taken", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = parse_register_request(payload.into_inner())?;
    let response: RegisterResponse = state.auth.register(registration).await?;
    session.persist_user(&response.user.id)?;
    Ok(HttpResponse::Created().json(response))
}

/// Verify credentials, apply the daily login bonus, and sign in.
///
/// Unknown emails and wrong passwords are indistinguishable.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponseSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = parse_login_request(payload.into_inner())?;
    let response = state.auth.login(credentials).await?;
    session.persist_user(&response.user.id)?;
    Ok(web::Json(response))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserProfileSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let user_id = session.require_user_id()?;
    let profile = state.profile.profile(&user_id).await?;
    Ok(web::Json(profile))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::{Email, UserId, Username, XpAwardOutcome};
    use crate::inbound::http::test_utils::{
        MockPorts, error_field, json_body, session_cookie, sign_in, test_app,
    };

    fn profile(user_id: &UserId) -> UserProfile {
        UserProfile {
            id: user_id.clone(),
            username: Username::new("quest_hero").expect("valid username"),
            email: Email::new("hero@example.com").expect("valid email"),
            level: 1,
            total_xp: 5,
            created_at: Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).single().expect("valid"),
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn register_signs_in_and_returns_the_bonus() {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        let registered = profile(&user_id);
        ports
            .auth
            .expect_register()
            .withf(|registration| registration.email().as_str() == "hero@example.com")
            .times(1)
            .return_once(move |_| {
                Ok(RegisterResponse {
                    user: registered,
                    xp: XpAwardOutcome::from_levels(5, 1, 1),
                })
            });
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "username": "quest_hero",
                "email": "Hero@Example.com",
                "password": "correct horse",
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(session_cookie(&response).is_some());
        let body = json_body(response).await;
        assert_eq!(body.pointer("/xp/newTotalXp").and_then(Value::as_i64), Some(5));
        assert_eq!(
            body.pointer("/user/username").and_then(Value::as_str),
            Some("quest_hero")
        );
    }

    #[rstest]
    #[case(json!({"email": "a@b.co", "password": "long enough"}), "username")]
    #[case(json!({"username": "quest_hero", "email": "nope", "password": "long enough"}), "email")]
    #[case(json!({"username": "quest_hero", "email": "a@b.co", "password": "short"}), "password")]
    #[case(json!({"username": "no spaces!", "email": "a@b.co", "password": "long enough"}), "username")]
    #[actix_web::test]
    async fn register_rejects_invalid_fields(#[case] body: Value, #[case] field: &str) {
        let mut ports = MockPorts::default();
        ports.auth.expect_register().times(0);
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(error_field(&body), Some(field));
    }

    #[rstest]
    #[actix_web::test]
    async fn login_reports_the_daily_bonus() {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        let user = profile(&user_id);
        ports.auth.expect_login().return_once(move |_| {
            Ok(LoginResponse {
                user,
                bonus_awarded: true,
                leveled_up: false,
            })
        });
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "hero@example.com", "password": "correct horse"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).is_some());
        let body = json_body(response).await;
        assert_eq!(body.get("bonusAwarded").and_then(Value::as_bool), Some(true));
    }

    #[rstest]
    #[actix_web::test]
    async fn bad_credentials_do_not_set_a_session() {
        let mut ports = MockPorts::default();
        ports
            .auth
            .expect_login()
            .returning(|_| Err(Error::unauthorized("invalid email or password")));
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "hero@example.com", "password": "wrong"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&response).is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn me_requires_a_session() {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;
        let request = actix_test::TestRequest::get().uri("/api/v1/auth/me").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn me_returns_the_signed_in_profile() {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        let expected = user_id.clone();
        let user = profile(&user_id);
        ports
            .profile
            .expect_profile()
            .withf(move |id| *id == expected)
            .return_once(move |_| Ok(user));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body.get("id").and_then(Value::as_str),
            Some(user_id.to_string().as_str())
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_clears_the_session() {
        let app = actix_test::init_service(test_app(MockPorts::default())).await;
        let cookie = sign_in(&app, &UserId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .cookie(cookie.clone())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cleared = session_cookie(&response).expect("removal cookie");
        assert_eq!(cleared.value(), "");
    }
}
