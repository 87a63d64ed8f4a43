//! Task service and the completion pipeline.
//!
//! Completion runs three stages with declared failure modes:
//!
//! 1. Status update. Authoritative; a conflict or missing task aborts.
//! 2. XP award. On failure the status update is reverted and the error
//!    returned, so a completed task always has its ledger entry.
//! 3. Achievement check. On failure the error is logged and the completion
//!    reports no new achievements; earlier stages stand.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::ports::{
    AchievementCommand, CompleteTaskResponse, CreateTaskRequest, TaskCommand, TaskPage, TaskQuery,
    TaskRepository, UpdateTaskRequest, XpCommand,
};
use crate::domain::service_support::{invalid_field, map_task_error, task_not_found};
use crate::domain::{
    Error, Task, TaskListQuery, TaskStatus, TaskTransitionError, UserId, XpAward,
    task_completion_description,
};

/// Task service implementing [`TaskCommand`] and [`TaskQuery`].
#[derive(Clone)]
pub struct TaskService<T> {
    tasks: Arc<T>,
    xp: Arc<dyn XpCommand>,
    achievements: Arc<dyn AchievementCommand>,
    clock: Arc<dyn Clock>,
}

impl<T> TaskService<T> {
    /// Create a service over the task repository and the XP and achievement
    /// ports used by the completion pipeline.
    pub fn new(
        tasks: Arc<T>,
        xp: Arc<dyn XpCommand>,
        achievements: Arc<dyn AchievementCommand>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            xp,
            achievements,
            clock,
        }
    }
}

fn map_transition_error(error: TaskTransitionError) -> Error {
    Error::conflict(error.to_string())
}

impl<T> TaskService<T>
where
    T: TaskRepository,
{
    async fn load(&self, user_id: &UserId, task_id: Uuid) -> Result<Task, Error> {
        self.tasks
            .find(user_id, task_id)
            .await
            .map_err(map_task_error)?
            .ok_or_else(task_not_found)
    }

    /// Validate the move against the current state, then apply it as a
    /// conditional update so a concurrent lifecycle change wins cleanly.
    async fn transition(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        to: TaskStatus,
        apply: fn(&mut Task, DateTime<Utc>) -> Result<(), TaskTransitionError>,
    ) -> Result<Task, Error> {
        let now = self.clock.utc();
        let mut task = self.load(user_id, task_id).await?;
        let from = task.status();
        apply(&mut task, now).map_err(map_transition_error)?;
        if let Some(moved) = self
            .tasks
            .change_status(user_id, task_id, from, to, now)
            .await
            .map_err(map_task_error)?
        {
            return Ok(moved);
        }
        let mut current = self.load(user_id, task_id).await?;
        Err(apply(&mut current, now).map_or_else(
            map_transition_error,
            |()| Error::conflict("task changed while it was being updated"),
        ))
    }

    async fn revert(&self, user_id: &UserId, task_id: Uuid, previous: TaskStatus) {
        if let Err(revert_error) = self
            .tasks
            .revert_completion(user_id, task_id, previous, self.clock.utc())
            .await
        {
            error!(
                user_id = %user_id,
                task_id = %task_id,
                error = %revert_error,
                "failed to revert completion after xp award failure"
            );
        }
    }
}

#[async_trait]
impl<T> TaskCommand for TaskService<T>
where
    T: TaskRepository,
{
    async fn create(&self, request: CreateTaskRequest) -> Result<Task, Error> {
        let CreateTaskRequest {
            user_id,
            content,
            tags,
        } = request;
        let task = Task::create(Uuid::new_v4(), user_id, content, self.clock.utc());
        self.tasks
            .insert(&task, &tags)
            .await
            .map_err(map_task_error)
    }

    async fn update(&self, request: UpdateTaskRequest) -> Result<Task, Error> {
        let UpdateTaskRequest {
            user_id,
            task_id,
            edit,
            tags,
        } = request;
        let mut task = self.load(&user_id, task_id).await?;
        task.apply_edit(edit, self.clock.utc())
            .map_err(|err| invalid_field(err.field(), err.to_string()))?;
        self.tasks
            .update(&task, &tags)
            .await
            .map_err(map_task_error)
    }

    async fn delete(&self, user_id: &UserId, task_id: Uuid) -> Result<(), Error> {
        let deleted = self
            .tasks
            .delete(user_id, task_id)
            .await
            .map_err(map_task_error)?;
        if deleted {
            Ok(())
        } else {
            Err(task_not_found())
        }
    }

    async fn complete(
        &self,
        user_id: &UserId,
        task_id: Uuid,
    ) -> Result<CompleteTaskResponse, Error> {
        let current = self.load(user_id, task_id).await?;
        if current.status() == TaskStatus::Completed {
            return Err(map_transition_error(TaskTransitionError::AlreadyCompleted));
        }
        let previous = current.status();

        let task = self
            .tasks
            .mark_completed(user_id, task_id, self.clock.utc())
            .await
            .map_err(map_task_error)?
            .ok_or_else(|| map_transition_error(TaskTransitionError::AlreadyCompleted))?;

        let award = XpAward::new(
            user_id.clone(),
            task.xp_value(),
            task_completion_description(task.title()),
        )
        .for_task(task_id);
        let outcome = match self.xp.award_xp(award).await {
            Ok(outcome) => outcome,
            Err(award_error) => {
                self.revert(user_id, task_id, previous).await;
                return Err(award_error);
            }
        };

        let new_achievements = match self.achievements.check_and_award(user_id).await {
            Ok(unlocked) => unlocked,
            Err(check_error) => {
                warn!(
                    user_id = %user_id,
                    task_id = %task_id,
                    error = %check_error,
                    "achievement check failed after completion"
                );
                Vec::new()
            }
        };

        Ok(CompleteTaskResponse {
            xp_awarded: task.xp_value(),
            task,
            new_total_xp: outcome.new_total_xp,
            new_level: outcome.new_level,
            leveled_up: outcome.leveled_up,
            new_achievements,
        })
    }

    async fn archive(&self, user_id: &UserId, task_id: Uuid) -> Result<Task, Error> {
        self.transition(user_id, task_id, TaskStatus::Archived, Task::archive).await
    }

    async fn unarchive(&self, user_id: &UserId, task_id: Uuid) -> Result<Task, Error> {
        self.transition(user_id, task_id, TaskStatus::Open, Task::unarchive).await
    }
}

#[async_trait]
impl<T> TaskQuery for TaskService<T>
where
    T: TaskRepository,
{
    async fn get(&self, user_id: &UserId, task_id: Uuid) -> Result<Task, Error> {
        self.load(user_id, task_id).await
    }

    async fn list(&self, user_id: &UserId, query: TaskListQuery) -> Result<TaskPage, Error> {
        self.tasks
            .list(user_id, &query)
            .await
            .map_err(map_task_error)
    }
}

#[cfg(test)]
#[path = "task_service_tests.rs"]
mod tests;
