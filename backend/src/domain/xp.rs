//! XP ledger entries and award outcomes.
//!
//! The ledger is append-only: a user's total XP is always the sum of their
//! entries and is never stored or edited in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// XP granted once when an account is created.
pub const REGISTRATION_BONUS_XP: i32 = 5;
/// Ledger description of the registration bonus.
pub const REGISTRATION_BONUS_DESCRIPTION: &str = "Registration bonus";
/// XP granted for the first login of each UTC day.
pub const DAILY_LOGIN_BONUS_XP: i32 = 2;
/// Ledger description of the daily login bonus.
pub const DAILY_LOGIN_DESCRIPTION: &str = "Daily login";

/// Ledger description for completing the task titled `title`.
#[must_use]
pub fn task_completion_description(title: &str) -> String {
    format!("Completed task: {title}")
}

/// A request to append one ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpAward {
    /// Receiving user.
    pub user_id: UserId,
    /// Signed XP amount.
    pub xp_value: i32,
    /// Human-readable reason shown in history.
    pub description: String,
    /// Task that produced the award, if any.
    pub related_task_id: Option<Uuid>,
}

impl XpAward {
    /// Build an award without a related task.
    pub fn new(user_id: UserId, xp_value: i32, description: impl Into<String>) -> Self {
        Self {
            user_id,
            xp_value,
            description: description.into(),
            related_task_id: None,
        }
    }

    /// Link the award to the task that produced it.
    #[must_use]
    pub fn for_task(mut self, task_id: Uuid) -> Self {
        self.related_task_id = Some(task_id);
        self
    }
}

/// Totals after an award has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAwardOutcome {
    /// Sum of every ledger entry including the new one.
    pub new_total_xp: i64,
    /// Level recomputed from `new_total_xp`.
    pub new_level: u32,
    /// Whether the award moved the user to a higher level.
    pub leveled_up: bool,
}

impl XpAwardOutcome {
    /// Build an outcome by comparing the level before and after an award.
    #[must_use]
    pub fn from_levels(new_total_xp: i64, previous_level: u32, new_level: u32) -> Self {
        Self {
            new_total_xp,
            new_level,
            leveled_up: new_level > previous_level,
        }
    }

    /// Outcome reporting unchanged totals, used when an award is skipped.
    #[must_use]
    pub const fn unchanged(total_xp: i64, level: u32) -> Self {
        Self {
            new_total_xp: total_xp,
            new_level: level,
            leveled_up: false,
        }
    }
}

/// Result of applying the daily login bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBonusOutcome {
    /// Whether a ledger entry was written for this login.
    pub awarded: bool,
    /// Totals after the login.
    #[serde(flatten)]
    pub outcome: XpAwardOutcome,
}

/// One immutable ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpLedgerEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Signed XP amount.
    pub xp_value: i32,
    /// Reason shown in history.
    pub description: String,
    /// Task that produced the entry; cleared when the task is deleted.
    pub related_task_id: Option<Uuid>,
    /// Append time.
    pub created_at: DateTime<Utc>,
}
