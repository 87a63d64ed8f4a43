//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types return
//! `Result<_, String>` because a stored value can drift from current
//! validation rules; callers map the message into their port error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Achievement, AchievementType, Email, Tag, TagColor, TagKind, TagName, TagSummary, Task,
    TaskParts, TaskPriority, TaskStatus, User, UserId, Username, XpLedgerEntry,
};

use super::schema::{
    achievements, tags, task_tags, tasks, user_achievements, users, xp_ledger,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "audit column, not surfaced in the domain")]
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            username: Username::new(&self.username).map_err(|err| err.to_string())?,
            email: Email::new(&self.email).map_err(|err| err.to_string())?,
            level: u32::try_from(self.level).map_err(|err| err.to_string())?,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// XP ledger
// ---------------------------------------------------------------------------

/// Row struct for reading ledger entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = xp_ledger)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct XpLedgerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub xp_value: i32,
    pub description: String,
    pub related_task_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<XpLedgerRow> for XpLedgerEntry {
    fn from(row: XpLedgerRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId::from_uuid(row.user_id),
            xp_value: row.xp_value,
            description: row.description,
            related_task_id: row.related_task_id,
            created_at: row.created_at,
        }
    }
}

/// Insertable ledger entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = xp_ledger)]
pub(crate) struct NewXpLedgerRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub xp_value: i32,
    pub description: &'a str,
    pub related_task_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Row struct for reading tasks; tags are loaded separately.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TaskRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: String,
    pub priority: i16,
    pub xp_value: i32,
    pub category: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    pub(crate) fn into_task(
        self,
        categories: Vec<TagSummary>,
        labels: Vec<TagSummary>,
    ) -> Result<Task, String> {
        let status = self
            .status
            .parse::<TaskStatus>()
            .map_err(|err| err.to_string())?;
        let priority = TaskPriority::from_rank(self.priority)
            .ok_or_else(|| format!("unknown priority rank {}", self.priority))?;
        Ok(Task::from_parts(TaskParts {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            status,
            priority,
            xp_value: self.xp_value,
            category: self.category,
            categories,
            labels,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

/// Insertable task columns.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub(crate) struct TaskWriteRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: &'a str,
    pub priority: i16,
    pub xp_value: i32,
    pub category: Option<&'a str>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> TaskWriteRow<'a> {
    pub(crate) fn from_task(task: &'a Task) -> Self {
        Self {
            id: task.id(),
            user_id: *task.user_id().as_uuid(),
            title: task.title(),
            description: task.description(),
            due_date: task.due_date(),
            status: task.status().as_str(),
            priority: task.priority().rank(),
            xp_value: task.xp_value(),
            category: task.category(),
            completed_at: task.completed_at(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Columns a task edit writes; never `status`, `completed_at` or `xp_value`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TaskEditChangeset<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: i16,
    pub category: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> TaskEditChangeset<'a> {
    pub(crate) fn from_task(task: &'a Task) -> Self {
        Self {
            title: task.title(),
            description: task.description(),
            due_date: task.due_date(),
            priority: task.priority().rank(),
            category: task.category(),
            updated_at: task.updated_at(),
        }
    }
}

/// Join row linking a task to a tag.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = task_tags)]
pub(crate) struct TaskTagRow {
    pub task_id: Uuid,
    pub tag_id: Uuid,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Row struct for reading tags.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TagRow {
    pub(crate) fn into_tag(self, task_count: i64) -> Result<Tag, String> {
        Ok(Tag {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            kind: self.kind.parse::<TagKind>()?,
            name: TagName::new(&self.name).map_err(|err| err.to_string())?,
            color: TagColor::new(&self.color).map_err(|err| err.to_string())?,
            task_count: u64::try_from(task_count).map_err(|err| err.to_string())?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    pub(crate) fn into_summary(self) -> Result<TagSummary, String> {
        Ok(TagSummary {
            id: self.id,
            kind: self.kind.parse::<TagKind>()?,
            name: self.name,
            color: self.color,
        })
    }
}

/// Insertable tag.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tags)]
pub(crate) struct NewTagRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub name: &'a str,
    pub color: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial tag update; `None` leaves a column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tags)]
pub(crate) struct TagChangeset<'a> {
    pub name: Option<&'a str>,
    pub color: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// Row struct for the seeded catalogue.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = achievements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AchievementRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub achievement_type: String,
    pub requirement_value: Option<i32>,
}

impl AchievementRow {
    pub(crate) fn into_achievement(self) -> Result<Achievement, String> {
        Ok(Achievement {
            id: self.id,
            name: self.name,
            description: self.description,
            achievement_type: self.achievement_type.parse::<AchievementType>()?,
            requirement_value: self.requirement_value,
        })
    }
}

/// Insertable unlock.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = user_achievements)]
pub(crate) struct NewUserAchievementRow {
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub unlocked_at: DateTime<Utc>,
}
