//! PostgreSQL-backed `TagRepository` implementation using Diesel ORM.
//!
//! Name uniqueness is enforced by the `tags_user_kind_name_key` index on
//! `(user_id, kind, LOWER(name))`; a violation surfaces as
//! [`TagRepositoryError::Duplicate`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{TagRepository, TagRepositoryError};
use crate::domain::{NewTag, Tag, TagEdit, TagKind, TagName, UserId};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, collect_rows, pool_error_message};
use super::models::{NewTagRow, TagChangeset, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{tags, task_tags};

define_sql_function! {
    /// SQL `LOWER(text)`.
    fn lower(value: Text) -> Text;
}

/// Diesel-backed implementation of the `TagRepository` port.
#[derive(Clone)]
pub struct DieselTagRepository {
    pool: DbPool,
}

impl DieselTagRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TagRepositoryError {
    TagRepositoryError::connection(pool_error_message(error))
}

/// Map Diesel errors; `name` identifies the tag being written, if any.
fn map_diesel_error(
    error: diesel::result::Error,
    written: Option<(TagKind, &str)>,
) -> TagRepositoryError {
    match (classify_diesel_error(error), written) {
        (DieselFailure::UniqueViolation { .. }, Some((kind, name))) => {
            TagRepositoryError::duplicate(kind, name)
        }
        (DieselFailure::Connection(message), _) => TagRepositoryError::connection(message),
        (DieselFailure::UniqueViolation { .. }, None) => {
            TagRepositoryError::query("unique constraint violated")
        }
        (DieselFailure::ForeignKeyViolation { .. }, _) => {
            TagRepositoryError::query("foreign key violation")
        }
        (DieselFailure::Query(message), _) => TagRepositoryError::query(message),
    }
}

fn map_read_error(error: diesel::result::Error) -> TagRepositoryError {
    map_diesel_error(error, None)
}

async fn task_counts(
    conn: &mut AsyncPgConnection,
    tag_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, TagRepositoryError> {
    if tag_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let counts: Vec<(Uuid, i64)> = task_tags::table
        .filter(task_tags::tag_id.eq_any(tag_ids))
        .group_by(task_tags::tag_id)
        .select((task_tags::tag_id, count_star()))
        .load(conn)
        .await
        .map_err(map_read_error)?;
    Ok(counts.into_iter().collect())
}

async fn with_counts(
    conn: &mut AsyncPgConnection,
    rows: Vec<TagRow>,
) -> Result<Vec<Tag>, TagRepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let counts = task_counts(conn, &ids).await?;
    collect_rows(
        rows.into_iter().map(|row| {
            let count = counts.get(&row.id).copied().unwrap_or(0);
            row.into_tag(count)
        }),
        TagRepositoryError::query,
    )
}

async fn with_count(
    conn: &mut AsyncPgConnection,
    row: Option<TagRow>,
) -> Result<Option<Tag>, TagRepositoryError> {
    match row {
        Some(row) => Ok(with_counts(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

#[async_trait]
impl TagRepository for DieselTagRepository {
    async fn list(&self, user_id: &UserId, kind: TagKind) -> Result<Vec<Tag>, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TagRow> = tags::table
            .filter(tags::user_id.eq(user_id.as_uuid()))
            .filter(tags::kind.eq(kind.as_str()))
            .order((lower(tags::name).asc(), tags::id.asc()))
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_read_error)?;
        with_counts(&mut conn, rows).await
    }

    async fn find(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
    ) -> Result<Option<Tag>, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TagRow> = tags::table
            .filter(tags::id.eq(id))
            .filter(tags::user_id.eq(user_id.as_uuid()))
            .filter(tags::kind.eq(kind.as_str()))
            .select(TagRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        with_count(&mut conn, row).await
    }

    async fn find_by_name(
        &self,
        user_id: &UserId,
        kind: TagKind,
        name: &TagName,
    ) -> Result<Option<Tag>, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TagRow> = tags::table
            .filter(tags::user_id.eq(user_id.as_uuid()))
            .filter(tags::kind.eq(kind.as_str()))
            .filter(lower(tags::name).eq(name.folded()))
            .select(TagRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;
        with_count(&mut conn, row).await
    }

    async fn insert(&self, tag: &NewTag) -> Result<Tag, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewTagRow {
            id: tag.id,
            user_id: *tag.user_id.as_uuid(),
            kind: tag.kind.as_str(),
            name: tag.name.as_str(),
            color: tag.color.as_str(),
            created_at: tag.created_at,
            updated_at: tag.created_at,
        };
        let stored: TagRow = diesel::insert_into(tags::table)
            .values(&row)
            .returning(TagRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some((tag.kind, tag.name.as_str()))))?;
        stored.into_tag(0).map_err(TagRepositoryError::query)
    }

    async fn update(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
        edit: &TagEdit,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Tag>, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = TagChangeset {
            name: edit.name.as_ref().map(TagName::as_str),
            color: edit.color.as_ref().map(|color| color.as_str()),
            updated_at,
        };
        let written_name = changes.name.unwrap_or_default();
        let row: Option<TagRow> = diesel::update(
            tags::table
                .filter(tags::id.eq(id))
                .filter(tags::user_id.eq(user_id.as_uuid()))
                .filter(tags::kind.eq(kind.as_str())),
        )
        .set(&changes)
        .returning(TagRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, Some((kind, written_name))))?;
        with_count(&mut conn, row).await
    }

    async fn delete(
        &self,
        user_id: &UserId,
        kind: TagKind,
        id: Uuid,
    ) -> Result<bool, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            tags::table
                .filter(tags::id.eq(id))
                .filter(tags::user_id.eq(user_id.as_uuid()))
                .filter(tags::kind.eq(kind.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_read_error)?;
        Ok(deleted > 0)
    }
}
