//! Driving port for XP awards.
//!
//! Every XP change in the system flows through this port so that ledger
//! writes, level recomputation, and level-up detection stay in one place.

use async_trait::async_trait;

use crate::domain::{DailyBonusOutcome, Error, UserId, XpAward, XpAwardOutcome};

/// Domain use-case port for awarding XP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait XpCommand: Send + Sync {
    /// Append one ledger entry and report the new totals.
    async fn award_xp(&self, award: XpAward) -> Result<XpAwardOutcome, Error>;

    /// Award the one-off registration bonus.
    async fn award_registration_bonus(&self, user_id: &UserId) -> Result<XpAwardOutcome, Error>;

    /// Award the daily login bonus unless it was already granted today.
    async fn award_daily_login_bonus(&self, user_id: &UserId) -> Result<DailyBonusOutcome, Error>;
}
