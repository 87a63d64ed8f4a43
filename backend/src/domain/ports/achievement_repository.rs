//! Port for the achievement catalogue and per-user unlocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Achievement, UnlockedAchievement, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by achievement repository adapters.
    pub enum AchievementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "achievement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "achievement repository query failed: {message}",
    }
}

/// Port for reading the catalogue and recording unlocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Every catalogue entry, ordered by type then requirement.
    async fn catalogue(&self) -> Result<Vec<Achievement>, AchievementRepositoryError>;

    /// The user's unlocks, newest first.
    async fn unlocked_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UnlockedAchievement>, AchievementRepositoryError>;

    /// Record an unlock.
    ///
    /// Idempotent: returns `true` only when this call created the unlock.
    async fn unlock(
        &self,
        user_id: &UserId,
        achievement_id: Uuid,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, AchievementRepositoryError>;
}
