//! Driving port for task mutations, including the completion pipeline.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Achievement, Error, TagAssignment, Task, TaskContent, TaskEdit, UserId};

/// Request to create a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    /// Owner.
    pub user_id: UserId,
    /// Validated fields.
    pub content: TaskContent,
    /// Tags to attach.
    pub tags: TagAssignment,
}

/// Request to edit a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    /// Owner.
    pub user_id: UserId,
    /// Task to edit.
    pub task_id: Uuid,
    /// Fields to change.
    pub edit: TaskEdit,
    /// Tag lists to replace.
    pub tags: TagAssignment,
}

/// Outcome of completing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteTaskResponse {
    /// The completed task.
    pub task: Task,
    /// XP granted for the completion.
    pub xp_awarded: i32,
    /// Ledger total after the award.
    pub new_total_xp: i64,
    /// Level after the award.
    pub new_level: u32,
    /// Whether the award raised the level.
    pub leveled_up: bool,
    /// Achievements unlocked by this completion.
    pub new_achievements: Vec<Achievement>,
}

/// Domain use-case port for task writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskCommand: Send + Sync {
    /// Create an open task.
    async fn create(&self, request: CreateTaskRequest) -> Result<Task, Error>;

    /// Apply a partial edit.
    async fn update(&self, request: UpdateTaskRequest) -> Result<Task, Error>;

    /// Delete a task; ledger entries survive.
    async fn delete(&self, user_id: &UserId, task_id: Uuid) -> Result<(), Error>;

    /// Complete a task, award its XP, and evaluate achievements.
    ///
    /// A second completion fails with a conflict and awards nothing. If the
    /// XP award fails the completion is reverted. Achievement failures are
    /// logged and reported as no new unlocks.
    async fn complete(&self, user_id: &UserId, task_id: Uuid)
    -> Result<CompleteTaskResponse, Error>;

    /// Archive an open task.
    async fn archive(&self, user_id: &UserId, task_id: Uuid) -> Result<Task, Error>;

    /// Reopen an archived task.
    async fn unarchive(&self, user_id: &UserId, task_id: Uuid) -> Result<Task, Error>;
}
