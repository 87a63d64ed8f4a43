//! Task aggregate and its lifecycle.
//!
//! A task starts `open`, may move between `open` and `archived`, and is
//! completed at most once. Its XP reward is derived from the priority when the
//! task is written and is frozen once the task is completed.

mod validation;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pagination::{PageLimits, PageRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TagSummary, UserId};

pub use validation::{
    CATEGORY_MAX, CATEGORY_IDS_MAX, DESCRIPTION_MAX, LABEL_IDS_MAX, TITLE_MAX, TagAssignment,
    TaskContent, TaskContentDraft, TaskEdit, TaskTitle, TaskValidationError,
};

/// Page sizes accepted by task listings.
pub const TASK_PAGE_LIMITS: PageLimits = PageLimits::new(&[10, 25, 50], 25);

/// Task urgency; fixes the XP reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskPriority {
    /// 10 XP.
    Low,
    /// 25 XP.
    Medium,
    /// 50 XP.
    High,
    /// 75 XP.
    Urgent,
}

impl TaskPriority {
    /// XP awarded for completing a task with this priority.
    ///
    /// # Examples
    /// ```
    /// use questlog::domain::TaskPriority;
    ///
    /// assert_eq!(TaskPriority::Medium.xp_value(), 25);
    /// assert_eq!(TaskPriority::Urgent.xp_value(), 75);
    /// ```
    #[must_use]
    pub const fn xp_value(self) -> i32 {
        match self {
            Self::Low => 10,
            Self::Medium => 25,
            Self::High => 50,
            Self::Urgent => 75,
        }
    }

    /// Storage rank; higher is more urgent.
    #[must_use]
    pub const fn rank(self) -> i16 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }

    /// Inverse of [`TaskPriority::rank`].
    #[must_use]
    pub const fn from_rank(rank: i16) -> Option<Self> {
        match rank {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            4 => Some(Self::Urgent),
            _ => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaskPriorityError(pub String);

impl fmt::Display for ParseTaskPriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "priority must be one of Low, Medium, High, Urgent, got {}",
            self.0
        )
    }
}

impl std::error::Error for ParseTaskPriorityError {}

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseTaskPriorityError(s.to_owned())),
        }
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Initial state.
    Open,
    /// Terminal state reached through completion.
    Completed,
    /// Hidden from active lists until unarchived.
    Archived,
}

impl TaskStatus {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaskStatusError(pub String);

impl fmt::Display for ParseTaskStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status must be one of open, completed, archived, got {}",
            self.0
        )
    }
}

impl std::error::Error for ParseTaskStatusError {}

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseTaskStatusError(s.to_owned())),
        }
    }
}

/// Rejected lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskTransitionError {
    /// The task was already completed.
    AlreadyCompleted,
    /// Only open tasks can be archived.
    NotOpen {
        /// Status at the time of the request.
        status: TaskStatus,
    },
    /// Only archived tasks can be unarchived.
    NotArchived {
        /// Status at the time of the request.
        status: TaskStatus,
    },
}

impl fmt::Display for TaskTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyCompleted => write!(f, "task is already completed"),
            Self::NotOpen { status } => write!(f, "only open tasks can be archived (task is {status})"),
            Self::NotArchived { status } => write!(f, "task is not archived (task is {status})"),
        }
    }
}

impl std::error::Error for TaskTransitionError {}

/// Field values used to rehydrate a stored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskParts {
    /// Task identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: UserId,
    /// Title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional due time.
    pub due_date: Option<DateTime<Utc>>,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Stored XP reward.
    pub xp_value: i32,
    /// Optional free-text category label.
    pub category: Option<String>,
    /// Attached categories.
    pub categories: Vec<TagSummary>,
    /// Attached labels.
    pub labels: Vec<TagSummary>,
    /// Completion time for completed tasks.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A user's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    parts: TaskParts,
}

impl Task {
    /// Create a new open task from validated content.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use questlog::domain::{Task, TaskContent, TaskContentDraft, TaskPriority, TaskStatus, UserId};
    /// use uuid::Uuid;
    ///
    /// let content = TaskContent::new(TaskContentDraft {
    ///     title: "Water plants".to_owned(),
    ///     description: None,
    ///     due_date: None,
    ///     priority: TaskPriority::High,
    ///     category: None,
    /// })
    /// .expect("valid content");
    /// let task = Task::create(Uuid::new_v4(), UserId::random(), content, Utc::now());
    /// assert_eq!(task.status(), TaskStatus::Open);
    /// assert_eq!(task.xp_value(), 50);
    /// ```
    #[must_use]
    pub fn create(id: Uuid, user_id: UserId, content: TaskContent, now: DateTime<Utc>) -> Self {
        let TaskContent {
            title,
            description,
            due_date,
            priority,
            category,
        } = content;
        Self {
            parts: TaskParts {
                id,
                user_id,
                title: title.into(),
                description,
                due_date,
                status: TaskStatus::Open,
                priority,
                xp_value: priority.xp_value(),
                category,
                categories: Vec::new(),
                labels: Vec::new(),
                completed_at: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    /// Rehydrate a stored task.
    #[must_use]
    pub fn from_parts(parts: TaskParts) -> Self {
        Self { parts }
    }

    /// Consume the task, returning its fields.
    #[must_use]
    pub fn into_parts(self) -> TaskParts {
        self.parts
    }

    /// Task identifier.
    pub fn id(&self) -> Uuid {
        self.parts.id
    }

    /// Owner.
    pub fn user_id(&self) -> &UserId {
        &self.parts.user_id
    }

    /// Title.
    pub fn title(&self) -> &str {
        &self.parts.title
    }

    /// Description.
    pub fn description(&self) -> Option<&str> {
        self.parts.description.as_deref()
    }

    /// Due time.
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.parts.due_date
    }

    /// Lifecycle state.
    pub fn status(&self) -> TaskStatus {
        self.parts.status
    }

    /// Urgency.
    pub fn priority(&self) -> TaskPriority {
        self.parts.priority
    }

    /// XP awarded on completion.
    pub fn xp_value(&self) -> i32 {
        self.parts.xp_value
    }

    /// Free-text category label.
    pub fn category(&self) -> Option<&str> {
        self.parts.category.as_deref()
    }

    /// Attached categories.
    pub fn categories(&self) -> &[TagSummary] {
        &self.parts.categories
    }

    /// Attached labels.
    pub fn labels(&self) -> &[TagSummary] {
        &self.parts.labels
    }

    /// Completion time.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.parts.completed_at
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.parts.created_at
    }

    /// Last modification time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.parts.updated_at
    }

    /// Replace attached tags after a write.
    pub fn set_tags(&mut self, categories: Vec<TagSummary>, labels: Vec<TagSummary>) {
        self.parts.categories = categories;
        self.parts.labels = labels;
    }

    /// Mark the task completed.
    ///
    /// Archived tasks may be completed directly; completed tasks may not.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), TaskTransitionError> {
        if self.parts.status == TaskStatus::Completed {
            return Err(TaskTransitionError::AlreadyCompleted);
        }
        self.parts.status = TaskStatus::Completed;
        self.parts.completed_at = Some(at);
        self.parts.updated_at = at;
        Ok(())
    }

    /// Move an open task to the archive.
    pub fn archive(&mut self, at: DateTime<Utc>) -> Result<(), TaskTransitionError> {
        if self.parts.status != TaskStatus::Open {
            return Err(TaskTransitionError::NotOpen {
                status: self.parts.status,
            });
        }
        self.parts.status = TaskStatus::Archived;
        self.parts.updated_at = at;
        Ok(())
    }

    /// Return an archived task to the open state.
    pub fn unarchive(&mut self, at: DateTime<Utc>) -> Result<(), TaskTransitionError> {
        if self.parts.status != TaskStatus::Archived {
            return Err(TaskTransitionError::NotArchived {
                status: self.parts.status,
            });
        }
        self.parts.status = TaskStatus::Open;
        self.parts.updated_at = at;
        Ok(())
    }

    /// Apply a partial edit.
    ///
    /// A priority change recomputes the XP reward unless the task is already
    /// completed, in which case the awarded value stays frozen.
    pub fn apply_edit(
        &mut self,
        edit: TaskEdit,
        at: DateTime<Utc>,
    ) -> Result<(), TaskValidationError> {
        let validated = edit.validate()?;
        if let Some(title) = validated.title {
            self.parts.title = title.into();
        }
        if let Some(description) = validated.description {
            self.parts.description = description;
        }
        if let Some(due_date) = validated.due_date {
            self.parts.due_date = due_date;
        }
        if let Some(category) = validated.category {
            self.parts.category = category;
        }
        if let Some(priority) = validated.priority {
            self.parts.priority = priority;
            if self.parts.status != TaskStatus::Completed {
                self.parts.xp_value = priority.xp_value();
            }
        }
        self.parts.updated_at = at;
        Ok(())
    }

    /// Copy the user-editable fields of `edited` onto this stored task.
    ///
    /// Lifecycle fields (`status`, `completed_at`) are left alone, so an edit
    /// prepared from an older read cannot undo a completion or archive that
    /// landed since. The XP reward follows the priority only while this task
    /// is not completed.
    pub fn merge_edit(&mut self, edited: &Self) {
        self.parts.title.clone_from(&edited.parts.title);
        self.parts.description.clone_from(&edited.parts.description);
        self.parts.due_date = edited.parts.due_date;
        self.parts.category.clone_from(&edited.parts.category);
        self.parts.priority = edited.parts.priority;
        if self.parts.status != TaskStatus::Completed {
            self.parts.xp_value = edited.parts.priority.xp_value();
        }
        self.parts.updated_at = edited.parts.updated_at;
    }

    /// Move to `to` when the current status is `from`.
    ///
    /// Returns `false` and leaves the task untouched otherwise.
    pub fn move_status(&mut self, from: TaskStatus, to: TaskStatus, at: DateTime<Utc>) -> bool {
        if self.parts.status != from {
            return false;
        }
        self.parts.status = to;
        self.parts.updated_at = at;
        true
    }

    /// Listing order: due date ascending with undated tasks last, then
    /// priority descending, then newest first.
    #[must_use]
    pub fn list_order(a: &Self, b: &Self) -> Ordering {
        let due = match (a.due_date(), b.due_date()) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        due.then_with(|| b.priority().cmp(&a.priority()))
            .then_with(|| b.created_at().cmp(&a.created_at()))
    }
}

/// Filters and page for task listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListQuery {
    /// Restrict to one status.
    pub status: Option<TaskStatus>,
    /// Restrict to any of these priorities; empty means all.
    pub priorities: Vec<TaskPriority>,
    /// Restrict to tasks carrying any category with these names.
    pub categories: Vec<String>,
    /// Restrict to tasks carrying any label with these names.
    pub labels: Vec<String>,
    /// Requested page.
    pub page: PageRequest,
}

impl TaskListQuery {
    /// Unfiltered first page with default size.
    #[must_use]
    pub fn first_page() -> Self {
        Self {
            status: None,
            priorities: Vec::new(),
            categories: Vec::new(),
            labels: Vec::new(),
            page: PageRequest::first(&TASK_PAGE_LIMITS),
        }
    }

    /// Whether `task` passes every filter (page excluded).
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = self.status.is_none_or(|status| task.status() == status);
        let priority_ok =
            self.priorities.is_empty() || self.priorities.contains(&task.priority());
        let categories_ok = self.categories.is_empty()
            || task
                .categories()
                .iter()
                .any(|tag| self.categories.contains(&tag.name));
        let labels_ok = self.labels.is_empty()
            || task
                .labels()
                .iter()
                .any(|tag| self.labels.contains(&tag.name));
        status_ok && priority_ok && categories_ok && labels_ok
    }
}

#[cfg(test)]
mod tests;
