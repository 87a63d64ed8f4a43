//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`]) describe what the domain
//! needs from infrastructure and carry typed errors built with
//! `define_port_error!`. Driving ports (`*Command`, `*Query`) are what inbound
//! adapters call; they return the domain [`Error`](crate::domain::Error).

mod macros;
pub(crate) use macros::define_port_error;

mod achievement_command;
mod achievement_query;
mod achievement_repository;
mod auth_command;
mod password_hasher;
mod tag_command;
mod tag_query;
mod tag_repository;
mod task_command;
mod task_query;
mod task_repository;
mod user_profile_command;
mod user_profile_query;
mod user_repository;
mod xp_command;
mod xp_ledger_repository;

#[cfg(test)]
pub use achievement_command::MockAchievementCommand;
pub use achievement_command::AchievementCommand;
#[cfg(test)]
pub use achievement_query::MockAchievementQuery;
pub use achievement_query::AchievementQuery;
#[cfg(test)]
pub use achievement_repository::MockAchievementRepository;
pub use achievement_repository::{AchievementRepository, AchievementRepositoryError};
#[cfg(test)]
pub use auth_command::MockAuthCommand;
pub use auth_command::{AuthCommand, LoginResponse, RegisterResponse};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use tag_command::MockTagCommand;
pub use tag_command::{CreateTagRequest, GetOrCreateTagResponse, TagCommand};
#[cfg(test)]
pub use tag_query::MockTagQuery;
pub use tag_query::TagQuery;
#[cfg(test)]
pub use tag_repository::MockTagRepository;
pub use tag_repository::{TagRepository, TagRepositoryError};
#[cfg(test)]
pub use task_command::MockTaskCommand;
pub use task_command::{CompleteTaskResponse, CreateTaskRequest, TaskCommand, UpdateTaskRequest};
#[cfg(test)]
pub use task_query::MockTaskQuery;
pub use task_query::TaskQuery;
#[cfg(test)]
pub use task_repository::MockTaskRepository;
pub use task_repository::{TaskPage, TaskRepository, TaskRepositoryError};
#[cfg(test)]
pub use user_profile_command::MockUserProfileCommand;
pub use user_profile_command::UserProfileCommand;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::{
    UserProfile, UserProfileQuery, UserStats, WeeklyActivity, XP_HISTORY_DEFAULT_LIMIT,
    XP_HISTORY_MAX_LIMIT,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use xp_command::MockXpCommand;
pub use xp_command::XpCommand;
#[cfg(test)]
pub use xp_ledger_repository::MockXpLedgerRepository;
pub use xp_ledger_repository::{XpLedgerRepository, XpLedgerRepositoryError};
