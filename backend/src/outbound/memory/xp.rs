//! Append-only XP ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{XpLedgerRepository, XpLedgerRepositoryError};
use crate::domain::{TimeWindow, UserId, XpAward, XpAwardOutcome, XpLedgerEntry, level_for};

use super::{MemoryState, MemoryStore};

impl MemoryState {
    fn total_for(&self, user_id: &UserId) -> i64 {
        self.ledger
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .map(|entry| i64::from(entry.xp_value))
            .sum()
    }

    /// Append under the caller's lock and re-level the user.
    fn append(
        &mut self,
        award: &XpAward,
        awarded_at: DateTime<Utc>,
    ) -> Result<XpAwardOutcome, XpLedgerRepositoryError> {
        let previous_level = self
            .users
            .get(award.user_id.as_uuid())
            .map(|row| row.user.level)
            .ok_or_else(XpLedgerRepositoryError::unknown_user)?;
        self.ledger.push(XpLedgerEntry {
            id: Uuid::new_v4(),
            user_id: award.user_id.clone(),
            xp_value: award.xp_value,
            description: award.description.clone(),
            related_task_id: award.related_task_id,
            created_at: awarded_at,
        });
        let total = self.total_for(&award.user_id);
        let new_level = level_for(total);
        if let Some(row) = self.users.get_mut(award.user_id.as_uuid()) {
            row.user.level = new_level;
        }
        Ok(XpAwardOutcome::from_levels(total, previous_level, new_level))
    }
}

#[async_trait]
impl XpLedgerRepository for MemoryStore {
    async fn award(
        &self,
        award: &XpAward,
        awarded_at: DateTime<Utc>,
    ) -> Result<XpAwardOutcome, XpLedgerRepositoryError> {
        self.lock().append(award, awarded_at)
    }

    async fn award_once_within(
        &self,
        award: &XpAward,
        window: TimeWindow,
        awarded_at: DateTime<Utc>,
    ) -> Result<Option<XpAwardOutcome>, XpLedgerRepositoryError> {
        let mut state = self.lock();
        if !state.users.contains_key(award.user_id.as_uuid()) {
            return Err(XpLedgerRepositoryError::unknown_user());
        }
        let already = state.ledger.iter().any(|entry| {
            entry.user_id == award.user_id
                && entry.description == award.description
                && window.contains(entry.created_at)
        });
        if already {
            return Ok(None);
        }
        state.append(award, awarded_at).map(Some)
    }

    async fn total_for_user(&self, user_id: &UserId) -> Result<i64, XpLedgerRepositoryError> {
        Ok(self.lock().total_for(user_id))
    }

    async fn sum_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<i64, XpLedgerRepositoryError> {
        Ok(self
            .lock()
            .ledger
            .iter()
            .filter(|entry| &entry.user_id == user_id && window.contains(entry.created_at))
            .map(|entry| i64::from(entry.xp_value))
            .sum())
    }

    async fn latest_with_description(
        &self,
        user_id: &UserId,
        description: &str,
    ) -> Result<Option<DateTime<Utc>>, XpLedgerRepositoryError> {
        Ok(self
            .lock()
            .ledger
            .iter()
            .filter(|entry| &entry.user_id == user_id && entry.description == description)
            .map(|entry| entry.created_at)
            .max())
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<XpLedgerEntry>, XpLedgerRepositoryError> {
        let state = self.lock();
        // Insertion order breaks timestamp ties.
        let mut entries: Vec<(usize, &XpLedgerEntry)> = state
            .ledger
            .iter()
            .enumerate()
            .filter(|(_, entry)| &entry.user_id == user_id)
            .collect();
        entries.sort_by(|(left_seq, left), (right_seq, right)| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| right_seq.cmp(left_seq))
        });
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(entries
            .into_iter()
            .take(take)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}
