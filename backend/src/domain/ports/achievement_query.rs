//! Driving port for achievement reads.
//!
//! Nothing behind this port unlocks achievements; progress is display-only.

use async_trait::async_trait;

use crate::domain::{Achievement, AchievementProgress, Error, UnlockedAchievement, UserId};

/// Domain use-case port for reading achievements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementQuery: Send + Sync {
    /// Full catalogue ordered by type then requirement.
    async fn catalogue(&self) -> Result<Vec<Achievement>, Error>;

    /// The user's unlocks, newest first.
    async fn unlocked(&self, user_id: &UserId) -> Result<Vec<UnlockedAchievement>, Error>;

    /// Catalogue annotated with unlock state and progress.
    async fn progress(&self, user_id: &UserId) -> Result<Vec<AchievementProgress>, Error>;
}
