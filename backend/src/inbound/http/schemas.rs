//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their serialised shape and register under the domain
//! type's name via `#[schema(as = ...)]`.

#![expect(
    dead_code,
    reason = "Schema wrappers are only read by utoipa during OpenAPI generation"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A dependency such as the database is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "title must not be empty")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details such as the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ports::UserProfile`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::UserProfile)]
#[schema(rename_all = "camelCase")]
pub struct UserProfileSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "quest_hero")]
    username: String,
    #[schema(example = "hero@example.com")]
    email: String,
    #[schema(example = 2)]
    level: u32,
    #[schema(example = 175)]
    total_xp: i64,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::XpAwardOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::XpAwardOutcome)]
#[schema(rename_all = "camelCase")]
pub struct XpAwardOutcomeSchema {
    new_total_xp: i64,
    new_level: u32,
    leveled_up: bool,
}

/// OpenAPI schema for [`crate::domain::ports::RegisterResponse`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::RegisterResponse)]
pub struct RegisterResponseSchema {
    user: UserProfileSchema,
    xp: XpAwardOutcomeSchema,
}

/// OpenAPI schema for [`crate::domain::ports::LoginResponse`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::LoginResponse)]
#[schema(rename_all = "camelCase")]
pub struct LoginResponseSchema {
    user: UserProfileSchema,
    /// Whether this login earned the daily bonus.
    bonus_awarded: bool,
    leveled_up: bool,
}

/// OpenAPI schema for [`crate::domain::LevelProgress`].
#[derive(ToSchema)]
#[schema(as = crate::domain::LevelProgress)]
#[schema(rename_all = "camelCase")]
pub struct LevelProgressSchema {
    level: u32,
    xp_into_level: i64,
    /// Absent at the maximum level.
    xp_for_level: Option<i64>,
    /// Absent at the maximum level.
    xp_to_next_level: Option<i64>,
}

/// OpenAPI schema for [`crate::domain::ports::WeeklyActivity`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::WeeklyActivity)]
#[schema(rename_all = "camelCase")]
pub struct WeeklyActivitySchema {
    tasks_completed_this_week: u64,
    xp_earned_this_week: i64,
    #[schema(value_type = Option<String>, format = DateTime)]
    last_login_date: Option<String>,
}

/// OpenAPI schema for [`crate::domain::ports::UserStats`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::UserStats)]
#[schema(rename_all = "camelCase")]
pub struct UserStatsSchema {
    level: u32,
    total_xp: i64,
    xp_to_next_level: Option<i64>,
    level_progress: LevelProgressSchema,
    completed_task_count: u64,
    achievements_count: u64,
    weekly_activity: WeeklyActivitySchema,
}

/// OpenAPI schema for [`crate::domain::XpLedgerEntry`].
#[derive(ToSchema)]
#[schema(as = crate::domain::XpLedgerEntry)]
#[schema(rename_all = "camelCase")]
pub struct XpLedgerEntrySchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    #[schema(example = 25)]
    xp_value: i32,
    #[schema(example = "Completed task: Write report")]
    description: String,
    #[schema(value_type = Option<String>, format = Uuid)]
    related_task_id: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::AchievementType`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AchievementType)]
pub enum AchievementTypeSchema {
    #[schema(rename = "task_milestone")]
    TaskMilestone,
    #[schema(rename = "level_milestone")]
    LevelMilestone,
    #[schema(rename = "special")]
    Special,
}

/// OpenAPI schema for [`crate::domain::Achievement`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Achievement)]
#[schema(rename_all = "camelCase")]
pub struct AchievementSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "First Steps")]
    name: String,
    #[schema(example = "Complete your first task")]
    description: String,
    achievement_type: AchievementTypeSchema,
    #[schema(example = 1)]
    requirement_value: Option<i32>,
}

/// OpenAPI schema for [`crate::domain::UnlockedAchievement`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UnlockedAchievement)]
#[schema(rename_all = "camelCase")]
pub struct UnlockedAchievementSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "First Steps")]
    name: String,
    description: String,
    achievement_type: AchievementTypeSchema,
    requirement_value: Option<i32>,
    #[schema(value_type = String, format = DateTime)]
    unlocked_at: String,
}

/// OpenAPI schema for [`crate::domain::AchievementProgress`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AchievementProgress)]
#[schema(rename_all = "camelCase")]
pub struct AchievementProgressSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "First Steps")]
    name: String,
    description: String,
    achievement_type: AchievementTypeSchema,
    requirement_value: Option<i32>,
    is_unlocked: bool,
    #[schema(value_type = Option<String>, format = DateTime)]
    unlocked_at: Option<String>,
    /// Omitted for unlocked and special achievements.
    progress: Option<u64>,
    /// Omitted for unlocked and special achievements.
    required: Option<u64>,
}

/// OpenAPI schema for [`crate::domain::Tag`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Tag)]
#[schema(rename_all = "camelCase")]
pub struct TagSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    #[schema(example = "category")]
    kind: String,
    #[schema(example = "Work")]
    name: String,
    #[schema(example = "#6B7280")]
    color: String,
    /// Number of the owner's tasks carrying this tag.
    task_count: u64,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::TagSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TagSummary)]
pub struct TagSummarySchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    name: String,
    color: String,
}

/// OpenAPI schema for `pagination::PaginationMeta`.
#[derive(ToSchema)]
#[schema(as = pagination::PaginationMeta)]
#[schema(rename_all = "camelCase")]
pub struct PaginationMetaSchema {
    #[schema(example = 1)]
    page: u32,
    #[schema(example = 25)]
    limit: u32,
    #[schema(example = 42)]
    total: u64,
    #[schema(example = 2)]
    total_pages: u64,
}
