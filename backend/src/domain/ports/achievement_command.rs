//! Driving port for achievement evaluation.

use async_trait::async_trait;

use crate::domain::{Achievement, Error, UserId};

/// Domain use-case port that unlocks qualifying achievements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementCommand: Send + Sync {
    /// Evaluate every locked achievement for the user and unlock the ones
    /// that qualify.
    ///
    /// Returns only achievements unlocked by this call; repeating the call
    /// with unchanged counters returns an empty list.
    async fn check_and_award(&self, user_id: &UserId) -> Result<Vec<Achievement>, Error>;
}
