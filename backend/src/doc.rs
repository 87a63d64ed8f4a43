//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every annotated handler under `/api/v1` plus the
//! health probes. Domain types are described through the wrappers in
//! [`crate::inbound::http::schemas`] so the domain stays free of utoipa.
//!
//! Swagger UI serves the document in debug builds; `cargo run --bin
//! openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::schemas::{
    AchievementProgressSchema, AchievementSchema, AchievementTypeSchema, ErrorCodeSchema,
    ErrorSchema, LevelProgressSchema, LoginResponseSchema, PaginationMetaSchema,
    RegisterResponseSchema, TagSchema, TagSummarySchema, UnlockedAchievementSchema,
    UserProfileSchema, UserStatsSchema, WeeklyActivitySchema, XpAwardOutcomeSchema,
    XpLedgerEntrySchema,
};
use crate::inbound::http::tags::{CreateTagPayload, GetOrCreateCategoryPayload, UpdateTagPayload};
use crate::inbound::http::tasks::{
    CompleteTaskBody, CreateTaskPayload, TaskPageSchema, TaskResponse, UpdateTaskPayload,
};
use crate::inbound::http::users::UpdateProfileRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login or /api/v1/auth/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Questlog API",
        description = "Task tracking with experience points, levels and achievements."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::delete_account,
        crate::inbound::http::users::get_stats,
        crate::inbound::http::users::get_xp_history,
        crate::inbound::http::tasks::list_tasks,
        crate::inbound::http::tasks::create_task,
        crate::inbound::http::tasks::get_task,
        crate::inbound::http::tasks::update_task,
        crate::inbound::http::tasks::delete_task,
        crate::inbound::http::tasks::complete_task,
        crate::inbound::http::tasks::archive_task,
        crate::inbound::http::tasks::unarchive_task,
        crate::inbound::http::tags::list_categories,
        crate::inbound::http::tags::create_category,
        crate::inbound::http::tags::get_or_create_category,
        crate::inbound::http::tags::get_category,
        crate::inbound::http::tags::update_category,
        crate::inbound::http::tags::delete_category,
        crate::inbound::http::tags::list_labels,
        crate::inbound::http::tags::create_label,
        crate::inbound::http::tags::get_label,
        crate::inbound::http::tags::update_label,
        crate::inbound::http::tags::delete_label,
        crate::inbound::http::achievements::list_achievements,
        crate::inbound::http::achievements::my_achievements,
        crate::inbound::http::achievements::achievement_progress,
        crate::inbound::http::achievements::check_achievements,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserProfileSchema,
        XpAwardOutcomeSchema,
        RegisterResponseSchema,
        LoginResponseSchema,
        LevelProgressSchema,
        WeeklyActivitySchema,
        UserStatsSchema,
        XpLedgerEntrySchema,
        AchievementTypeSchema,
        AchievementSchema,
        UnlockedAchievementSchema,
        AchievementProgressSchema,
        TagSchema,
        TagSummarySchema,
        PaginationMetaSchema,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        CreateTaskPayload,
        UpdateTaskPayload,
        TaskResponse,
        TaskPageSchema,
        CompleteTaskBody,
        CreateTagPayload,
        UpdateTagPayload,
        GetOrCreateCategoryPayload,
    )),
    tags(
        (name = "auth", description = "Registration and session management"),
        (name = "users", description = "Profile, statistics and XP history"),
        (name = "tasks", description = "Task lifecycle and completion rewards"),
        (name = "categories", description = "Per-user task categories"),
        (name = "labels", description = "Per-user task labels"),
        (name = "achievements", description = "Achievement catalogue and unlocks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
