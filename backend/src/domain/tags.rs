//! User-owned categories and labels.
//!
//! Both kinds share one shape; names are unique per user and kind without
//! regard to case.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Maximum tag name length in characters.
pub const TAG_NAME_MAX: usize = 50;
/// Colour applied when none is supplied.
pub const DEFAULT_TAG_COLOR: &str = "#6B7280";

/// Whether a tag is a category or a label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// Coarse grouping; up to ten per task.
    #[default]
    Category,
    /// Fine-grained marker; up to twenty per task.
    Label,
}

impl TagKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Label => "label",
        }
    }

    /// Human-readable noun used in error messages.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Label => "Label",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(Self::Category),
            "label" => Ok(Self::Label),
            other => Err(format!("unknown tag kind {other}")),
        }
    }
}

/// Validation failures for tag payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    /// Name blank after trimming.
    EmptyName,
    /// Name over [`TAG_NAME_MAX`].
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Colour not in `#RRGGBB` form.
    InvalidColor,
}

impl TagValidationError {
    /// Payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::InvalidColor => "color",
        }
    }
}

impl fmt::Display for TagValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidColor => write!(f, "color must be a hex colour like #1A2B3C"),
        }
    }
}

impl std::error::Error for TagValidationError {}

/// Trimmed tag name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Validate a name.
    ///
    /// # Examples
    /// ```
    /// use questlog::domain::TagName;
    ///
    /// assert_eq!(TagName::new("  Work ").expect("valid").as_str(), "Work");
    /// assert!(TagName::new("   ").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TagValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TagValidationError::EmptyName);
        }
        if trimmed.chars().count() > TAG_NAME_MAX {
            return Err(TagValidationError::NameTooLong { max: TAG_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used for case-insensitive uniqueness.
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }
}

impl From<TagName> for String {
    fn from(value: TagName) -> Self {
        value.0
    }
}

impl TryFrom<String> for TagName {
    type Error = TagValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static COLOR_RE: OnceLock<Regex> = OnceLock::new();

fn color_regex() -> &'static Regex {
    COLOR_RE.get_or_init(|| match Regex::new("^#[0-9A-Fa-f]{6}$") {
        Ok(regex) => regex,
        Err(error) => panic!("colour regex failed to compile: {error}"),
    })
}

/// `#RRGGBB` colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagColor(String);

impl TagColor {
    /// Validate a colour.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TagValidationError> {
        let trimmed = raw.as_ref().trim();
        if !color_regex().is_match(trimmed) {
            return Err(TagValidationError::InvalidColor);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Use `raw` when present, else [`DEFAULT_TAG_COLOR`].
    pub fn or_default(raw: Option<&str>) -> Result<Self, TagValidationError> {
        raw.map_or_else(|| Ok(Self::default()), Self::new)
    }

    /// Borrow the colour.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TagColor {
    fn default() -> Self {
        Self(DEFAULT_TAG_COLOR.to_owned())
    }
}

impl From<TagColor> for String {
    fn from(value: TagColor) -> Self {
        value.0
    }
}

impl TryFrom<String> for TagColor {
    type Error = TagValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A stored category or label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: UserId,
    /// Category or label.
    pub kind: TagKind,
    /// Display name.
    pub name: TagName,
    /// Display colour.
    pub color: TagColor,
    /// Number of the owner's tasks carrying this tag.
    pub task_count: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// Compact form embedded in task payloads.
    #[must_use]
    pub fn summary(&self) -> TagSummary {
        TagSummary {
            id: self.id,
            kind: self.kind,
            name: self.name.as_str().to_owned(),
            color: self.color.as_str().to_owned(),
        }
    }
}

/// Tag as attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    /// Tag identifier.
    pub id: Uuid,
    /// Category or label.
    #[serde(skip)]
    pub kind: TagKind,
    /// Display name.
    pub name: String,
    /// Display colour.
    pub color: String,
}

/// Fields for a new tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    /// Identifier chosen by the service.
    pub id: Uuid,
    /// Owner.
    pub user_id: UserId,
    /// Category or label.
    pub kind: TagKind,
    /// Display name.
    pub name: TagName,
    /// Display colour.
    pub color: TagColor,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Partial tag update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEdit {
    /// New name.
    pub name: Option<TagName>,
    /// New colour.
    pub color: Option<TagColor>,
}

impl TagEdit {
    /// Validate raw edit values.
    pub fn new(name: Option<&str>, color: Option<&str>) -> Result<Self, TagValidationError> {
        Ok(Self {
            name: name.map(TagName::new).transpose()?,
            color: color.map(TagColor::new).transpose()?,
        })
    }
}
