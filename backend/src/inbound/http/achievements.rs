//! Achievement HTTP handlers.
//!
//! ```text
//! GET  /api/v1/achievements
//! GET  /api/v1/achievements/me
//! GET  /api/v1/achievements/progress
//! POST /api/v1/achievements/check
//! ```

use actix_web::{get, post, web};

use crate::domain::{Achievement, AchievementProgress, UnlockedAchievement};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    AchievementProgressSchema, AchievementSchema, ErrorSchema, UnlockedAchievementSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Full achievement catalogue.
#[utoipa::path(
    get,
    path = "/api/v1/achievements",
    responses(
        (status = 200, description = "Catalogue", body = [AchievementSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["achievements"],
    operation_id = "listAchievements"
)]
#[get("/achievements")]
pub async fn list_achievements(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Achievement>>> {
    session.require_user_id()?;
    Ok(web::Json(state.achievements_query.catalogue().await?))
}

/// Achievements the signed-in user has unlocked, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/achievements/me",
    responses(
        (status = 200, description = "Unlocked achievements", body = [UnlockedAchievementSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["achievements"],
    operation_id = "myAchievements"
)]
#[get("/achievements/me")]
pub async fn my_achievements(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UnlockedAchievement>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.achievements_query.unlocked(&user_id).await?))
}

/// Catalogue annotated with unlock state and milestone progress.
#[utoipa::path(
    get,
    path = "/api/v1/achievements/progress",
    responses(
        (status = 200, description = "Achievement progress", body = [AchievementProgressSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["achievements"],
    operation_id = "achievementProgress"
)]
#[get("/achievements/progress")]
pub async fn achievement_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AchievementProgress>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.achievements_query.progress(&user_id).await?))
}

/// Re-evaluate the catalogue and unlock anything that now qualifies.
///
/// Returns only the achievements unlocked by this request.
#[utoipa::path(
    post,
    path = "/api/v1/achievements/check",
    responses(
        (status = 200, description = "Newly unlocked achievements", body = [AchievementSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["achievements"],
    operation_id = "checkAchievements"
)]
#[post("/achievements/check")]
pub async fn check_achievements(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Achievement>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.achievements.check_and_award(&user_id).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::Value;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{AchievementType, UserId};
    use crate::inbound::http::test_utils::{MockPorts, json_body, sign_in, test_app};

    fn achievement(name: &str, kind: AchievementType, requirement: Option<i32>) -> Achievement {
        Achievement {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: format!("{name} description"),
            achievement_type: kind,
            requirement_value: requirement,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn catalogue_requires_a_session() {
        let mut ports = MockPorts::default();
        ports.achievements_query.expect_catalogue().times(0);
        let app = actix_test::init_service(test_app(ports)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/achievements")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn unlocked_achievements_are_flattened() {
        let user_id = UserId::random();
        let unlocked_at = Utc
            .with_ymd_and_hms(2026, 5, 1, 8, 30, 0)
            .single()
            .expect("valid timestamp");
        let mut ports = MockPorts::default();
        ports
            .achievements_query
            .expect_unlocked()
            .times(1)
            .returning(move |_| {
                Ok(vec![UnlockedAchievement {
                    achievement: achievement("First Steps", AchievementType::TaskMilestone, Some(1)),
                    unlocked_at,
                }])
            });
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/achievements/me")
            .cookie(cookie)
            .to_request();
        let body = json_body(actix_test::call_service(&app, request).await).await;
        assert_eq!(
            body.pointer("/0/name").and_then(Value::as_str),
            Some("First Steps")
        );
        assert!(body.pointer("/0/unlockedAt").is_some());
    }

    #[rstest]
    #[actix_web::test]
    async fn progress_omits_counters_for_special_achievements() {
        let user_id = UserId::random();
        let mut ports = MockPorts::default();
        ports.achievements_query.expect_progress().returning(|_| {
            Ok(vec![
                AchievementProgress {
                    achievement: achievement("Task Apprentice", AchievementType::TaskMilestone, Some(10)),
                    is_unlocked: false,
                    unlocked_at: None,
                    progress: Some(4),
                    required: Some(10),
                },
                AchievementProgress {
                    achievement: achievement("Efficiency Master", AchievementType::Special, None),
                    is_unlocked: false,
                    unlocked_at: None,
                    progress: None,
                    required: None,
                },
            ])
        });
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/achievements/progress")
            .cookie(cookie)
            .to_request();
        let body = json_body(actix_test::call_service(&app, request).await).await;
        assert_eq!(body.pointer("/0/progress").and_then(Value::as_u64), Some(4));
        assert_eq!(body.pointer("/0/isUnlocked").and_then(Value::as_bool), Some(false));
        assert!(body.pointer("/1/progress").is_none());
        assert_eq!(
            body.pointer("/1/achievementType").and_then(Value::as_str),
            Some("special")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn check_returns_only_new_unlocks() {
        let user_id = UserId::random();
        let expected = user_id.clone();
        let mut ports = MockPorts::default();
        ports
            .achievements
            .expect_check_and_award()
            .withf(move |id| *id == expected)
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let app = actix_test::init_service(test_app(ports)).await;
        let cookie = sign_in(&app, &user_id).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/achievements/check")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, Value::Array(Vec::new()));
    }
}
