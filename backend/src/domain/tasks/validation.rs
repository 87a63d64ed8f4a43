//! Field rules for task writes.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::TaskPriority;

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 200;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX: usize = 1000;
/// Maximum free-text category length in characters.
pub const CATEGORY_MAX: usize = 50;
/// Maximum number of categories on one task.
pub const CATEGORY_IDS_MAX: usize = 10;
/// Maximum number of labels on one task.
pub const LABEL_IDS_MAX: usize = 20;

/// Validation failures for task payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title missing or blank.
    EmptyTitle,
    /// Title over [`TITLE_MAX`].
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Description over [`DESCRIPTION_MAX`].
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Category over [`CATEGORY_MAX`].
    CategoryTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// More categories than [`CATEGORY_IDS_MAX`].
    TooManyCategories {
        /// Maximum accepted count.
        max: usize,
    },
    /// More labels than [`LABEL_IDS_MAX`].
    TooManyLabels {
        /// Maximum accepted count.
        max: usize,
    },
}

impl TaskValidationError {
    /// Payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::DescriptionTooLong { .. } => "description",
            Self::CategoryTooLong { .. } => "category",
            Self::TooManyCategories { .. } => "categoryIds",
            Self::TooManyLabels { .. } => "labelIds",
        }
    }
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::CategoryTooLong { max } => {
                write!(f, "category must be at most {max} characters")
            }
            Self::TooManyCategories { max } => {
                write!(f, "a task can have at most {max} categories")
            }
            Self::TooManyLabels { max } => write!(f, "a task can have at most {max} labels"),
        }
    }
}

impl std::error::Error for TaskValidationError {}

/// Trimmed, non-empty task title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Validate a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(TaskValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the title.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<TaskTitle> for String {
    fn from(value: TaskTitle) -> Self {
        value.0
    }
}

fn optional_text(
    raw: Option<String>,
    max: usize,
    too_long: TaskValidationError,
) -> Result<Option<String>, TaskValidationError> {
    let Some(text) = raw else {
        return Ok(None);
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(Some(trimmed.to_owned()))
}

fn description(raw: Option<String>) -> Result<Option<String>, TaskValidationError> {
    optional_text(
        raw,
        DESCRIPTION_MAX,
        TaskValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX,
        },
    )
}

fn category(raw: Option<String>) -> Result<Option<String>, TaskValidationError> {
    optional_text(
        raw,
        CATEGORY_MAX,
        TaskValidationError::CategoryTooLong { max: CATEGORY_MAX },
    )
}

/// Raw values for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContentDraft {
    /// Title as submitted.
    pub title: String,
    /// Description as submitted.
    pub description: Option<String>,
    /// Due time as submitted.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority as submitted.
    pub priority: TaskPriority,
    /// Free-text category as submitted.
    pub category: Option<String>,
}

/// Validated values for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContent {
    /// Title.
    pub title: TaskTitle,
    /// Description; blank input becomes `None`.
    pub description: Option<String>,
    /// Due time.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority.
    pub priority: TaskPriority,
    /// Free-text category; blank input becomes `None`.
    pub category: Option<String>,
}

impl TaskContent {
    /// Validate a draft.
    pub fn new(draft: TaskContentDraft) -> Result<Self, TaskValidationError> {
        Ok(Self {
            title: TaskTitle::new(&draft.title)?,
            description: description(draft.description)?,
            due_date: draft.due_date,
            priority: draft.priority,
            category: category(draft.category)?,
        })
    }
}

/// Partial update of a task.
///
/// The outer `Option` marks presence; for nullable fields the inner `None`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    /// New title.
    pub title: Option<String>,
    /// New or cleared description.
    pub description: Option<Option<String>>,
    /// New or cleared due time.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New or cleared free-text category.
    pub category: Option<Option<String>>,
}

pub(super) struct ValidatedEdit {
    pub(super) title: Option<TaskTitle>,
    pub(super) description: Option<Option<String>>,
    pub(super) due_date: Option<Option<DateTime<Utc>>>,
    pub(super) priority: Option<TaskPriority>,
    pub(super) category: Option<Option<String>>,
}

impl TaskEdit {
    /// Whether the edit changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.category.is_none()
    }

    pub(super) fn validate(self) -> Result<ValidatedEdit, TaskValidationError> {
        Ok(ValidatedEdit {
            title: self.title.map(TaskTitle::new).transpose()?,
            description: self.description.map(description).transpose()?,
            due_date: self.due_date,
            priority: self.priority,
            category: self.category.map(category).transpose()?,
        })
    }
}

/// Requested tag attachments.
///
/// `None` leaves the current attachments untouched on update; `Some` replaces
/// them. Duplicate ids are collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAssignment {
    categories: Option<Vec<Uuid>>,
    labels: Option<Vec<Uuid>>,
}

impl TagAssignment {
    /// Validate requested attachments.
    pub fn new(
        categories: Option<Vec<Uuid>>,
        labels: Option<Vec<Uuid>>,
    ) -> Result<Self, TaskValidationError> {
        let categories = categories.map(dedup);
        let labels = labels.map(dedup);
        if categories
            .as_ref()
            .is_some_and(|ids| ids.len() > CATEGORY_IDS_MAX)
        {
            return Err(TaskValidationError::TooManyCategories {
                max: CATEGORY_IDS_MAX,
            });
        }
        if labels.as_ref().is_some_and(|ids| ids.len() > LABEL_IDS_MAX) {
            return Err(TaskValidationError::TooManyLabels { max: LABEL_IDS_MAX });
        }
        Ok(Self { categories, labels })
    }

    /// Categories to attach, if the request set them.
    pub fn categories(&self) -> Option<&[Uuid]> {
        self.categories.as_deref()
    }

    /// Labels to attach, if the request set them.
    pub fn labels(&self) -> Option<&[Uuid]> {
        self.labels.as_deref()
    }
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
