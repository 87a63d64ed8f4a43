//! Driving port for profile, stats, and XP history reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Email, Error, LevelProgress, User, UserId, Username, XpLedgerEntry};

/// Default number of history entries returned.
pub const XP_HISTORY_DEFAULT_LIMIT: u32 = 20;
/// Largest history page a caller may request.
pub const XP_HISTORY_MAX_LIMIT: u32 = 100;

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account identifier.
    pub id: UserId,
    /// Public handle.
    pub username: Username,
    /// Login email.
    pub email: Email,
    /// Current level.
    pub level: u32,
    /// Sum of the user's ledger.
    pub total_xp: i64,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Combine an account row with its ledger total.
    #[must_use]
    pub fn from_user(user: User, total_xp: i64) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            level: user.level,
            total_xp,
            created_at: user.created_at,
        }
    }
}

/// Activity inside the current calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyActivity {
    /// Tasks completed this week.
    pub tasks_completed_this_week: u64,
    /// XP earned this week.
    pub xp_earned_this_week: i64,
    /// Time of the most recent bonus-earning login.
    pub last_login_date: Option<DateTime<Utc>>,
}

/// Aggregated progression figures for the stats screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Current level.
    pub level: u32,
    /// Sum of the ledger.
    pub total_xp: i64,
    /// XP still needed for the next level; absent at the top level.
    pub xp_to_next_level: Option<i64>,
    /// Position inside the current level.
    pub level_progress: LevelProgress,
    /// Completed tasks across all time.
    pub completed_task_count: u64,
    /// Achievements unlocked.
    pub achievements_count: u64,
    /// This week's activity.
    pub weekly_activity: WeeklyActivity,
}

/// Domain use-case port for account reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Fetch the caller's profile.
    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, Error>;

    /// Compute the caller's stats.
    async fn stats(&self, user_id: &UserId) -> Result<UserStats, Error>;

    /// Newest ledger entries first, at most `limit`.
    async fn xp_history(&self, user_id: &UserId, limit: u32)
    -> Result<Vec<XpLedgerEntry>, Error>;
}
