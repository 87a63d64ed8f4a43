//! Categories and labels.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{TagRepository, TagRepositoryError};
use crate::domain::{NewTag, Tag, TagEdit, TagKind, TagName, UserId};

use super::{MemoryState, MemoryStore};

impl MemoryState {
    fn counted(&self, tag: &Tag) -> Tag {
        let count = self
            .task_tags
            .values()
            .filter(|links| links.contains(&tag.id))
            .count();
        Tag {
            task_count: u64::try_from(count).unwrap_or(u64::MAX),
            ..tag.clone()
        }
    }

    fn owned_tag(&self, user_id: &UserId, kind: TagKind, id: Uuid) -> Option<&Tag> {
        self.tags
            .get(&id)
            .filter(|tag| &tag.user_id == user_id && tag.kind == kind)
    }

    /// Whether another tag of this owner and kind already uses `name`,
    /// compared case-insensitively.
    fn name_taken(&self, user_id: &UserId, kind: TagKind, name: &TagName, except: Option<Uuid>) -> bool {
        let folded = name.folded();
        self.tags.values().any(|tag| {
            &tag.user_id == user_id
                && tag.kind == kind
                && Some(tag.id) != except
                && tag.name.folded() == folded
        })
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn list(&self, user_id: &UserId, kind: TagKind) -> Result<Vec<Tag>, TagRepositoryError> {
        let state = self.lock();
        let mut tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|tag| &tag.user_id == user_id && tag.kind == kind)
            .map(|tag| state.counted(tag))
            .collect();
        tags.sort_by(|a, b| a.name.folded().cmp(&b.name.folded()).then(a.id.cmp(&b.id)));
        Ok(tags)
    }

    async fn find(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
    ) -> Result<Option<Tag>, TagRepositoryError> {
        let state = self.lock();
        Ok(state
            .owned_tag(user_id, kind, id)
            .map(|tag| state.counted(tag)))
    }

    async fn find_by_name(
        &self,
        user_id: &UserId,
        kind: TagKind,
        name: &TagName,
    ) -> Result<Option<Tag>, TagRepositoryError> {
        let state = self.lock();
        let folded = name.folded();
        Ok(state
            .tags
            .values()
            .find(|tag| &tag.user_id == user_id && tag.kind == kind && tag.name.folded() == folded)
            .map(|tag| state.counted(tag)))
    }

    async fn insert(&self, tag: &NewTag) -> Result<Tag, TagRepositoryError> {
        let mut state = self.lock();
        if state.name_taken(&tag.user_id, tag.kind, &tag.name, None) {
            return Err(TagRepositoryError::duplicate(tag.kind, tag.name.as_str()));
        }
        let stored = Tag {
            id: tag.id,
            user_id: tag.user_id.clone(),
            kind: tag.kind,
            name: tag.name.clone(),
            color: tag.color.clone(),
            task_count: 0,
            created_at: tag.created_at,
            updated_at: tag.created_at,
        };
        state.tags.insert(tag.id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
        edit: &TagEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Tag>, TagRepositoryError> {
        let mut state = self.lock();
        if state.owned_tag(user_id, kind, id).is_none() {
            return Ok(None);
        }
        let clash = edit
            .name
            .as_ref()
            .filter(|name| state.name_taken(user_id, kind, name, Some(id)));
        if let Some(name) = clash {
            return Err(TagRepositoryError::duplicate(kind, name.as_str()));
        }
        let Some(stored) = state.tags.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &edit.name {
            stored.name = name.clone();
        }
        if let Some(color) = &edit.color {
            stored.color = color.clone();
        }
        stored.updated_at = updated_at;
        let updated = stored.clone();
        Ok(Some(state.counted(&updated)))
    }

    async fn delete(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
    ) -> Result<bool, TagRepositoryError> {
        let mut state = self.lock();
        if state.owned_tag(user_id, kind, id).is_none() {
            return Ok(false);
        }
        state.tags.remove(&id);
        for links in state.task_tags.values_mut() {
            links.retain(|linked| linked != &id);
        }
        Ok(true)
    }
}
