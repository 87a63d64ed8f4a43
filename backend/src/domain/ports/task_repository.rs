//! Port for task persistence, listing, and completion counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    TagAssignment, TagKind, Task, TaskListQuery, TaskStatus, TimeWindow, UrgentWeekSummary,
    UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by task repository adapters.
    pub enum TaskRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "task repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "task repository query failed: {message}",
        /// A requested tag does not exist or belongs to someone else.
        UnknownTag { kind: TagKind, id: Uuid } => "{kind} {id} does not exist",
    }
}

/// One page of tasks plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Tasks on the requested page, in listing order.
    pub tasks: Vec<Task>,
    /// Matches across all pages.
    pub total: u64,
}

/// Port for reading and writing tasks.
///
/// Every lookup is scoped to the owner; a task owned by someone else is
/// indistinguishable from a missing one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a task and attach the requested tags.
    async fn insert(&self, task: &Task, tags: &TagAssignment) -> Result<Task, TaskRepositoryError>;

    /// Persist the user-editable fields of `task` and replace any tag lists
    /// present in `tags`.
    ///
    /// `status` and `completed_at` are never written here; lifecycle moves go
    /// through [`TaskRepository::change_status`] and
    /// [`TaskRepository::mark_completed`]. The XP reward is rewritten from the
    /// priority only while the stored task is not completed.
    async fn update(&self, task: &Task, tags: &TagAssignment) -> Result<Task, TaskRepositoryError>;

    /// Fetch one task.
    async fn find(
        &self,
        user_id: &UserId,
        task_id: Uuid,
    ) -> Result<Option<Task>, TaskRepositoryError>;

    /// Delete one task; `false` when nothing matched.
    async fn delete(&self, user_id: &UserId, task_id: Uuid) -> Result<bool, TaskRepositoryError>;

    /// Filtered, ordered, paged listing.
    async fn list(
        &self,
        user_id: &UserId,
        query: &TaskListQuery,
    ) -> Result<TaskPage, TaskRepositoryError>;

    /// Complete the task if it is not already completed.
    ///
    /// The status check and the write are a single conditional update, so
    /// concurrent completions succeed at most once. Returns `None` when the
    /// task is missing or already completed.
    async fn mark_completed(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskRepositoryError>;

    /// Move the task from `from` to `to` in one conditional update.
    ///
    /// Returns `None` when the task is missing or no longer in `from`.
    async fn change_status(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskRepositoryError>;

    /// Undo a completion, restoring `previous` and clearing `completed_at`.
    ///
    /// Only a task that is still completed is touched.
    async fn revert_completion(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        previous: TaskStatus,
        reverted_at: DateTime<Utc>,
    ) -> Result<(), TaskRepositoryError>;

    /// Completed tasks across all time.
    async fn count_completed(&self, user_id: &UserId) -> Result<u64, TaskRepositoryError>;

    /// Tasks completed inside `window`.
    async fn count_completed_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<u64, TaskRepositoryError>;

    /// Urgent tasks due inside `window` and how many of them are completed.
    async fn urgent_due_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<UrgentWeekSummary, TaskRepositoryError>;
}
