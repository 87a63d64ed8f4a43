//! Domain primitives, rules, and services.
//!
//! Purpose: hold the progression core (level table, XP ledger semantics,
//! achievement evaluation) and the task lifecycle, independent of HTTP and
//! storage. Adapters talk to the services here through the traits in
//! [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Leveling: [`LEVEL_THRESHOLDS`], [`level_for`], [`progress_within_level`].
//! - Aggregates: [`User`], [`Task`], [`Tag`], [`Achievement`].
//! - Services: [`XpService`], [`TaskService`], [`AchievementService`],
//!   [`AuthService`], [`UserProfileService`], [`TagService`].

pub mod achievements;
pub mod auth;
pub mod calendar;
pub mod error;
pub mod leveling;
pub mod ports;
pub mod tags;
pub mod tasks;
pub mod trace_id;
pub mod user;
pub mod xp;

mod achievement_service;
mod auth_service;
pub(crate) mod service_support;
mod tag_service;
mod task_service;
mod user_profile_service;
mod xp_service;

pub use self::achievement_service::AchievementService;
pub use self::achievements::{
    Achievement, AchievementCounters, AchievementProgress, AchievementType, EFFICIENCY_MASTER,
    UnlockedAchievement, UrgentWeekSummary,
};
pub use self::auth::{
    AuthValidationError, LoginCredentials, PASSWORD_MAX, PASSWORD_MIN, Registration,
};
pub use self::auth_service::AuthService;
pub use self::calendar::TimeWindow;
pub use self::error::{Error, ErrorCode};
pub use self::leveling::{
    LEVEL_THRESHOLDS, LevelProgress, MAX_LEVEL, STARTING_LEVEL, level_for, progress_within_level,
    threshold_for,
};
pub use self::tag_service::TagService;
pub use self::tags::{
    DEFAULT_TAG_COLOR, NewTag, TAG_NAME_MAX, Tag, TagColor, TagEdit, TagKind,
    TagName, TagSummary, TagValidationError,
};
pub use self::task_service::TaskService;
pub use self::tasks::{
    CATEGORY_IDS_MAX, CATEGORY_MAX, DESCRIPTION_MAX, LABEL_IDS_MAX, ParseTaskPriorityError,
    ParseTaskStatusError, TASK_PAGE_LIMITS, TITLE_MAX, TagAssignment, Task, TaskContent,
    TaskContentDraft, TaskEdit, TaskListQuery, TaskParts, TaskPriority, TaskStatus, TaskTitle,
    TaskTransitionError, TaskValidationError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, Email, NewUser, USERNAME_MAX, USERNAME_MIN, User, UserCredentials, UserId,
    UserValidationError, Username,
};
pub use self::user_profile_service::UserProfileService;
pub use self::xp::{
    DAILY_LOGIN_BONUS_XP, DAILY_LOGIN_DESCRIPTION, DailyBonusOutcome, REGISTRATION_BONUS_DESCRIPTION,
    REGISTRATION_BONUS_XP, XpAward, XpAwardOutcome, XpLedgerEntry, task_completion_description,
};
pub use self::xp_service::XpService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use questlog::domain::{ApiResult, Error};
///
/// fn complete() -> ApiResult<()> {
///     Err(Error::conflict("task is already completed"))
/// }
/// assert!(complete().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
