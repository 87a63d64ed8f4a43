//! Port for the append-only XP ledger.
//!
//! Adapters own the atomicity of an award: the new entry, the recomputed
//! total, and the cached level on the user row must be written under one
//! per-user lock so concurrent awards never lose an update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{TimeWindow, UserId, XpAward, XpAwardOutcome, XpLedgerEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by XP ledger adapters.
    pub enum XpLedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "xp ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "xp ledger query failed: {message}",
        /// The award targets an account that does not exist.
        UnknownUser => "xp award targets an unknown user",
    }
}

/// Port for appending and aggregating ledger entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait XpLedgerRepository: Send + Sync {
    /// Append `award` and update the user's cached level atomically.
    async fn award(
        &self,
        award: &XpAward,
        awarded_at: DateTime<Utc>,
    ) -> Result<XpAwardOutcome, XpLedgerRepositoryError>;

    /// Append `award` unless the user already has an entry with the same
    /// description inside `window`.
    ///
    /// The check and the insert share the award's per-user lock. Returns
    /// `None` when the award was skipped.
    async fn award_once_within(
        &self,
        award: &XpAward,
        window: TimeWindow,
        awarded_at: DateTime<Utc>,
    ) -> Result<Option<XpAwardOutcome>, XpLedgerRepositoryError>;

    /// Sum of every entry for the user.
    async fn total_for_user(&self, user_id: &UserId) -> Result<i64, XpLedgerRepositoryError>;

    /// Sum of entries created inside `window`.
    async fn sum_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<i64, XpLedgerRepositoryError>;

    /// Creation time of the newest entry with `description`.
    async fn latest_with_description(
        &self,
        user_id: &UserId,
        description: &str,
    ) -> Result<Option<DateTime<Utc>>, XpLedgerRepositoryError>;

    /// Newest entries first, at most `limit`.
    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<XpLedgerEntry>, XpLedgerRepositoryError>;
}
