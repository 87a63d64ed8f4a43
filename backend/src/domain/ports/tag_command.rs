//! Driving port for category and label writes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Tag, TagColor, TagEdit, TagKind, TagName, UserId};

/// Request to create a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTagRequest {
    /// Owner.
    pub user_id: UserId,
    /// Category or label.
    pub kind: TagKind,
    /// Display name.
    pub name: TagName,
    /// Display colour.
    pub color: TagColor,
}

/// Result of a get-or-create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOrCreateTagResponse {
    /// Existing or new tag.
    pub tag: Tag,
    /// Whether the call created the tag.
    pub created: bool,
}

/// Domain use-case port for tag writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagCommand: Send + Sync {
    /// Create a tag; duplicate names are a conflict.
    async fn create(&self, request: CreateTagRequest) -> Result<Tag, Error>;

    /// Rename or recolour a tag.
    async fn update(
        &self,
        user_id: &UserId,
        kind: TagKind,
        tag_id: Uuid,
        edit: TagEdit,
    ) -> Result<Tag, Error>;

    /// Delete a tag, detaching it from tasks.
    async fn delete(&self, user_id: &UserId, kind: TagKind, tag_id: Uuid) -> Result<(), Error>;

    /// Return the category named `name`, creating it with the default colour
    /// when absent.
    async fn get_or_create_category(
        &self,
        user_id: &UserId,
        name: TagName,
    ) -> Result<GetOrCreateTagResponse, Error>;
}
