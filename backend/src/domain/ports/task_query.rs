//! Driving port for task reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Task, TaskListQuery, UserId};

use super::TaskPage;

/// Domain use-case port for task reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskQuery: Send + Sync {
    /// Fetch one of the caller's tasks.
    async fn get(&self, user_id: &UserId, task_id: Uuid) -> Result<Task, Error>;

    /// Filtered, ordered, paged listing of the caller's tasks.
    async fn list(&self, user_id: &UserId, query: TaskListQuery) -> Result<TaskPage, Error>;
}
