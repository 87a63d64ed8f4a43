//! In-process implementation of every repository port.
//!
//! [`MemoryStore`] backs the server when no database URL is configured and
//! drives the integration suite. All state sits behind one mutex, so each
//! port call is atomic: an XP award appends, re-sums and re-levels in a
//! single critical section, matching the row lock the Diesel ledger takes.
//! Deletes cascade the same way the foreign keys in the schema do.

mod achievements;
mod tags;
mod tasks;
mod users;
mod xp;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Achievement, Tag, Task, User, XpLedgerEntry};

pub use self::achievements::seeded_catalogue;

/// Stored account row.
#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
}

/// Stored unlock.
#[derive(Debug, Clone, Copy)]
struct UnlockRecord {
    user_id: Uuid,
    achievement_id: Uuid,
    unlocked_at: DateTime<Utc>,
}

#[derive(Debug)]
struct MemoryState {
    users: HashMap<Uuid, UserRecord>,
    ledger: Vec<XpLedgerEntry>,
    /// Tasks without tag summaries; links live in `task_tags`.
    tasks: HashMap<Uuid, Task>,
    /// Task id to attached tag ids, in attach order.
    task_tags: HashMap<Uuid, Vec<Uuid>>,
    /// Tags with a zero `task_count`; counts are derived on read.
    tags: HashMap<Uuid, Tag>,
    catalogue: Vec<Achievement>,
    unlocks: Vec<UnlockRecord>,
}

impl MemoryState {
    fn seeded() -> Self {
        Self {
            users: HashMap::new(),
            ledger: Vec::new(),
            tasks: HashMap::new(),
            task_tags: HashMap::new(),
            tags: HashMap::new(),
            catalogue: seeded_catalogue(),
            unlocks: Vec::new(),
        }
    }

    /// Drop every row owned by `user_id`.
    fn cascade_user(&mut self, user_id: &Uuid) {
        self.ledger.retain(|entry| entry.user_id.as_uuid() != user_id);
        let owned: Vec<Uuid> = self
            .tasks
            .values()
            .filter(|task| task.user_id().as_uuid() == user_id)
            .map(Task::id)
            .collect();
        for task_id in owned {
            self.tasks.remove(&task_id);
            self.task_tags.remove(&task_id);
        }
        self.tags.retain(|_, tag| tag.user_id.as_uuid() != user_id);
        self.unlocks.retain(|unlock| &unlock.user_id != user_id);
    }
}

/// Mutex-guarded store implementing the user, XP ledger, task, tag and
/// achievement repositories.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Empty store with the achievement catalogue seeded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::seeded()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_fixtures;
