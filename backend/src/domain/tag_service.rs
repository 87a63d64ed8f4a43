//! Category and label management.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    CreateTagRequest, GetOrCreateTagResponse, TagCommand, TagQuery, TagRepository,
    TagRepositoryError,
};
use crate::domain::service_support::{map_tag_error, tag_not_found};
use crate::domain::{Error, NewTag, Tag, TagColor, TagEdit, TagKind, TagName, UserId};

/// Tag service implementing [`TagCommand`] and [`TagQuery`].
#[derive(Clone)]
pub struct TagService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> TagService<R> {
    /// Create a service over a tag repository.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R> TagService<R>
where
    R: TagRepository,
{
    async fn insert(
        &self,
        user_id: &UserId,
        kind: TagKind,
        name: TagName,
        color: TagColor,
    ) -> Result<Tag, TagRepositoryError> {
        let tag = NewTag {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            kind,
            name,
            color,
            created_at: self.clock.utc(),
        };
        self.repo.insert(&tag).await
    }

    async fn find_category(&self, user_id: &UserId, name: &TagName) -> Result<Option<Tag>, Error> {
        self.repo
            .find_by_name(user_id, TagKind::Category, name)
            .await
            .map_err(map_tag_error)
    }
}

#[async_trait]
impl<R> TagCommand for TagService<R>
where
    R: TagRepository,
{
    async fn create(&self, request: CreateTagRequest) -> Result<Tag, Error> {
        let CreateTagRequest {
            user_id,
            kind,
            name,
            color,
        } = request;
        self.insert(&user_id, kind, name, color)
            .await
            .map_err(map_tag_error)
    }

    async fn update(
        &self,
        user_id: &UserId,
        kind: TagKind,
        tag_id: Uuid,
        edit: TagEdit,
    ) -> Result<Tag, Error> {
        self.repo
            .update(user_id, kind, tag_id, &edit, self.clock.utc())
            .await
            .map_err(map_tag_error)?
            .ok_or_else(|| tag_not_found(kind))
    }

    async fn delete(&self, user_id: &UserId, kind: TagKind, tag_id: Uuid) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete(user_id, kind, tag_id)
            .await
            .map_err(map_tag_error)?;
        if deleted {
            Ok(())
        } else {
            Err(tag_not_found(kind))
        }
    }

    async fn get_or_create_category(
        &self,
        user_id: &UserId,
        name: TagName,
    ) -> Result<GetOrCreateTagResponse, Error> {
        if let Some(tag) = self.find_category(user_id, &name).await? {
            return Ok(GetOrCreateTagResponse {
                tag,
                created: false,
            });
        }

        match self
            .insert(user_id, TagKind::Category, name.clone(), TagColor::default())
            .await
        {
            Ok(tag) => Ok(GetOrCreateTagResponse { tag, created: true }),
            Err(TagRepositoryError::Duplicate { .. }) => {
                // A concurrent request created it between the lookup and the insert.
                debug!(user_id = %user_id, name = %name.as_str(), "category created concurrently");
                let tag = self
                    .find_category(user_id, &name)
                    .await?
                    .ok_or_else(|| tag_not_found(TagKind::Category))?;
                Ok(GetOrCreateTagResponse {
                    tag,
                    created: false,
                })
            }
            Err(other) => Err(map_tag_error(other)),
        }
    }
}

#[async_trait]
impl<R> TagQuery for TagService<R>
where
    R: TagRepository,
{
    async fn list(&self, user_id: &UserId, kind: TagKind) -> Result<Vec<Tag>, Error> {
        self.repo.list(user_id, kind).await.map_err(map_tag_error)
    }

    async fn get(&self, user_id: &UserId, kind: TagKind, tag_id: Uuid) -> Result<Tag, Error> {
        self.repo
            .find(user_id, kind, tag_id)
            .await
            .map_err(map_tag_error)?
            .ok_or_else(|| tag_not_found(kind))
    }
}

#[cfg(test)]
#[path = "tag_service_tests.rs"]
mod tests;
