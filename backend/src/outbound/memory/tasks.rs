//! Tasks and their tag links.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{TaskPage, TaskRepository, TaskRepositoryError};
use crate::domain::service_support::to_count;
use crate::domain::{
    TagAssignment, TagKind, TagSummary, Task, TaskListQuery, TaskPriority, TaskStatus, TimeWindow,
    UrgentWeekSummary, UserId,
};

use super::{MemoryState, MemoryStore};

impl MemoryState {
    /// Copy of `task` carrying its current tag summaries, sorted by name.
    fn hydrate(&self, task: &Task) -> Task {
        let mut categories: Vec<TagSummary> = Vec::new();
        let mut labels: Vec<TagSummary> = Vec::new();
        let links = self.task_tags.get(&task.id()).map_or(&[][..], Vec::as_slice);
        for tag in links.iter().filter_map(|id| self.tags.get(id)) {
            match tag.kind {
                TagKind::Category => categories.push(tag.summary()),
                TagKind::Label => labels.push(tag.summary()),
            }
        }
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        let mut hydrated = task.clone();
        hydrated.set_tags(categories, labels);
        hydrated
    }

    fn owned_task(&self, user_id: &UserId, task_id: Uuid) -> Option<&Task> {
        self.tasks
            .get(&task_id)
            .filter(|task| task.user_id() == user_id)
    }

    fn check_tags(
        &self,
        owner: &UserId,
        kind: TagKind,
        ids: Option<&[Uuid]>,
    ) -> Result<(), TaskRepositoryError> {
        let missing = ids.unwrap_or_default().iter().find(|id| {
            !self
                .tags
                .get(id)
                .is_some_and(|tag| &tag.user_id == owner && tag.kind == kind)
        });
        match missing {
            Some(id) => Err(TaskRepositoryError::unknown_tag(kind, *id)),
            None => Ok(()),
        }
    }

    /// Replace links of each kind the assignment names; other kinds stay.
    fn assign(
        &mut self,
        task: &Task,
        assignment: &TagAssignment,
    ) -> Result<(), TaskRepositoryError> {
        self.check_tags(task.user_id(), TagKind::Category, assignment.categories())?;
        self.check_tags(task.user_id(), TagKind::Label, assignment.labels())?;
        for (kind, ids) in [
            (TagKind::Category, assignment.categories()),
            (TagKind::Label, assignment.labels()),
        ] {
            let Some(ids) = ids else { continue };
            let tags = &self.tags;
            let links = self.task_tags.entry(task.id()).or_default();
            links.retain(|id| tags.get(id).is_some_and(|tag| tag.kind != kind));
            links.extend_from_slice(ids);
        }
        Ok(())
    }

    /// Store `task` stripped of summaries, then return it hydrated.
    fn write(&mut self, task: &Task) -> Task {
        let mut bare = task.clone();
        bare.set_tags(Vec::new(), Vec::new());
        self.tasks.insert(task.id(), bare);
        self.hydrate(task)
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn insert(&self, task: &Task, tags: &TagAssignment) -> Result<Task, TaskRepositoryError> {
        let mut state = self.lock();
        state.assign(task, tags)?;
        Ok(state.write(task))
    }

    async fn update(&self, task: &Task, tags: &TagAssignment) -> Result<Task, TaskRepositoryError> {
        let mut state = self.lock();
        let Some(stored) = state.owned_task(task.user_id(), task.id()) else {
            return Err(TaskRepositoryError::query("task vanished during update"));
        };
        let mut merged = stored.clone();
        merged.merge_edit(task);
        state.assign(&merged, tags)?;
        Ok(state.write(&merged))
    }

    async fn find(
        &self,
        user_id: &UserId,
        task_id: Uuid,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let state = self.lock();
        Ok(state
            .owned_task(user_id, task_id)
            .map(|task| state.hydrate(task)))
    }

    async fn delete(&self, user_id: &UserId, task_id: Uuid) -> Result<bool, TaskRepositoryError> {
        let mut state = self.lock();
        if state.owned_task(user_id, task_id).is_none() {
            return Ok(false);
        }
        state.tasks.remove(&task_id);
        state.task_tags.remove(&task_id);
        for entry in &mut state.ledger {
            if entry.related_task_id == Some(task_id) {
                entry.related_task_id = None;
            }
        }
        Ok(true)
    }

    async fn list(
        &self,
        user_id: &UserId,
        query: &TaskListQuery,
    ) -> Result<TaskPage, TaskRepositoryError> {
        let state = self.lock();
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.user_id() == user_id)
            .map(|task| state.hydrate(task))
            .filter(|task| query.matches(task))
            .collect();
        matching.sort_by(Task::list_order);
        let total = to_count(matching.len());
        let skip = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(query.page.limit()).unwrap_or(usize::MAX);
        let tasks = matching.into_iter().skip(skip).take(take).collect();
        Ok(TaskPage { tasks, total })
    }

    async fn mark_completed(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let mut state = self.lock();
        let Some(stored) = state.tasks.get_mut(&task_id) else {
            return Ok(None);
        };
        if stored.user_id() != user_id || stored.complete(completed_at).is_err() {
            return Ok(None);
        }
        let completed = stored.clone();
        Ok(Some(state.hydrate(&completed)))
    }

    async fn change_status(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let mut state = self.lock();
        let Some(stored) = state.tasks.get_mut(&task_id) else {
            return Ok(None);
        };
        if stored.user_id() != user_id || !stored.move_status(from, to, at) {
            return Ok(None);
        }
        let moved = stored.clone();
        Ok(Some(state.hydrate(&moved)))
    }

    async fn revert_completion(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        previous: TaskStatus,
        reverted_at: DateTime<Utc>,
    ) -> Result<(), TaskRepositoryError> {
        let mut state = self.lock();
        let Some(stored) = state.tasks.get_mut(&task_id) else {
            return Ok(());
        };
        if stored.user_id() != user_id || stored.status() != TaskStatus::Completed {
            return Ok(());
        }
        let mut parts = stored.clone().into_parts();
        parts.status = previous;
        parts.completed_at = None;
        parts.updated_at = reverted_at;
        *stored = Task::from_parts(parts);
        Ok(())
    }

    async fn count_completed(&self, user_id: &UserId) -> Result<u64, TaskRepositoryError> {
        let state = self.lock();
        Ok(to_count(
            state
                .tasks
                .values()
                .filter(|task| task.user_id() == user_id)
                .filter(|task| task.status() == TaskStatus::Completed)
                .count(),
        ))
    }

    async fn count_completed_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<u64, TaskRepositoryError> {
        let state = self.lock();
        Ok(to_count(
            state
                .tasks
                .values()
                .filter(|task| task.user_id() == user_id)
                .filter(|task| task.status() == TaskStatus::Completed)
                .filter(|task| task.completed_at().is_some_and(|at| window.contains(at)))
                .count(),
        ))
    }

    async fn urgent_due_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<UrgentWeekSummary, TaskRepositoryError> {
        let state = self.lock();
        let due: Vec<&Task> = state
            .tasks
            .values()
            .filter(|task| task.user_id() == user_id)
            .filter(|task| task.priority() == TaskPriority::Urgent)
            .filter(|task| task.due_date().is_some_and(|at| window.contains(at)))
            .collect();
        let completed = due
            .iter()
            .filter(|task| task.status() == TaskStatus::Completed)
            .count();
        Ok(UrgentWeekSummary {
            total: to_count(due.len()),
            completed: to_count(completed),
        })
    }
}
