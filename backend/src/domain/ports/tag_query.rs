//! Driving port for category and label reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Tag, TagKind, UserId};

/// Domain use-case port for tag reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagQuery: Send + Sync {
    /// The caller's tags of `kind`, ordered by name.
    async fn list(&self, user_id: &UserId, kind: TagKind) -> Result<Vec<Tag>, Error>;

    /// One of the caller's tags.
    async fn get(&self, user_id: &UserId, kind: TagKind, tag_id: Uuid) -> Result<Tag, Error>;
}
