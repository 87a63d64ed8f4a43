//! Port for category and label persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewTag, Tag, TagEdit, TagKind, TagName, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by tag repository adapters.
    pub enum TagRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "tag repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "tag repository query failed: {message}",
        /// The owner already has a tag of this kind with the same folded name.
        Duplicate { kind: TagKind, name: String } => "{kind} named {name} already exists",
    }
}

/// Port for reading and writing one user's categories and labels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Tags of `kind` ordered by name, with task counts.
    async fn list(&self, user_id: &UserId, kind: TagKind) -> Result<Vec<Tag>, TagRepositoryError>;

    /// One tag by id.
    async fn find(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
    ) -> Result<Option<Tag>, TagRepositoryError>;

    /// One tag by case-insensitive name.
    async fn find_by_name(
        &self,
        user_id: &UserId,
        kind: TagKind,
        name: &TagName,
    ) -> Result<Option<Tag>, TagRepositoryError>;

    /// Insert a tag.
    async fn insert(&self, tag: &NewTag) -> Result<Tag, TagRepositoryError>;

    /// Apply an edit; `None` when the tag does not exist.
    async fn update(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
        edit: &TagEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Tag>, TagRepositoryError>;

    /// Delete a tag and detach it from tasks; `false` when nothing matched.
    async fn delete(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
    ) -> Result<bool, TagRepositoryError>;
}
