//! Profile, statistics, and XP history for the signed-in user.
//!
//! ```text
//! GET    /api/v1/users/me
//! PUT    /api/v1/users/me {"username":"new_name"}
//! DELETE /api/v1/users/me
//! GET    /api/v1/users/me/stats
//! GET    /api/v1/users/me/xp-history?limit=20
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{UserProfile, UserStats, XP_HISTORY_DEFAULT_LIMIT, XP_HISTORY_MAX_LIMIT};
use crate::domain::{Error, Username, XpLedgerEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ErrorSchema, UserProfileSchema, UserStatsSchema, XpLedgerEntrySchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, missing_field_error};

/// Request body for `PUT /api/v1/users/me`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[schema(example = "quest_hero")]
    pub username: Option<String>,
}

/// Query string for `GET /api/v1/users/me/xp-history`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct XpHistoryParams {
    /// Entries to return, 1 to 100; defaults to 20.
    pub limit: Option<u32>,
}

fn parse_update_profile(payload: UpdateProfileRequest) -> Result<Username, Error> {
    let username = payload
        .username
        .ok_or_else(|| missing_field_error("username"))?;
    Username::new(&username).map_err(|error| invalid_field_error(error.field(), error))
}

fn parse_history_limit(limit: Option<u32>) -> Result<u32, Error> {
    match limit {
        None => Ok(XP_HISTORY_DEFAULT_LIMIT),
        Some(limit) if (1..=XP_HISTORY_MAX_LIMIT).contains(&limit) => Ok(limit),
        Some(limit) => Err(Error::invalid_request(format!(
            "limit must be between 1 and {XP_HISTORY_MAX_LIMIT}"
        ))
        .with_details(json!({
            "field": "limit",
            "value": limit,
            "code": "invalid_field",
        }))),
    }
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = UserProfileSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/users/me")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.profile.profile(&user_id).await?))
}

/// Change the signed-in user's username.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfileSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Username taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let user_id = session.require_user_id()?;
    let username = parse_update_profile(payload.into_inner())?;
    let profile = state
        .profile_command
        .update_username(&user_id, username)
        .await?;
    Ok(web::Json(profile))
}

/// Delete the signed-in user's account and everything it owns.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/me")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.profile_command.delete_account(&user_id).await?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// Level, XP, and weekly activity for the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/stats",
    responses(
        (status = 200, description = "Statistics", body = UserStatsSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getStats"
)]
#[get("/users/me/stats")]
pub async fn get_stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserStats>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.profile.stats(&user_id).await?))
}

/// Most recent ledger entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/xp-history",
    params(XpHistoryParams),
    responses(
        (status = 200, description = "Ledger entries", body = [XpLedgerEntrySchema]),
        (status = 400, description = "Invalid limit", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getXpHistory"
)]
#[get("/users/me/xp-history")]
pub async fn get_xp_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<XpHistoryParams>,
) -> ApiResult<web::Json<Vec<XpLedgerEntry>>> {
    let user_id = session.require_user_id()?;
    let limit = parse_history_limit(params.limit)?;
    Ok(web::Json(state.profile.xp_history(&user_id, limit).await?))
}
