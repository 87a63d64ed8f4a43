//! PostgreSQL-backed `TaskRepository` implementation using Diesel ORM.
//!
//! Tags live in the `task_tags` join table and are hydrated onto tasks after
//! every read. Writes that touch tags run in a transaction so a rejected tag
//! id leaves no partial task behind.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{TaskPage, TaskRepository, TaskRepositoryError};
use crate::domain::service_support::to_count;
use crate::domain::{
    TagAssignment, TagKind, TagSummary, Task, TaskListQuery, TaskPriority, TaskStatus, TimeWindow,
    UrgentWeekSummary, UserId,
};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, collect_rows, from_sql_count, pool_error_message,
    to_sql_limit,
};
use super::models::{TagRow, TaskEditChangeset, TaskRow, TaskTagRow, TaskWriteRow};
use super::pool::{DbPool, PoolError};
use super::schema::{tags, task_tags, tasks};

/// Diesel-backed implementation of the `TaskRepository` port.
#[derive(Clone)]
pub struct DieselTaskRepository {
    pool: DbPool,
}

impl DieselTaskRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TaskRepositoryError {
    TaskRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> TaskRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => TaskRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            TaskRepositoryError::query("unique constraint violated")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            TaskRepositoryError::query("foreign key violation")
        }
        DieselFailure::Query(message) => TaskRepositoryError::query(message),
    }
}

/// Failure inside a task write transaction.
#[derive(Debug)]
enum TaskWriteFailure {
    Diesel(diesel::result::Error),
    UnknownTag { kind: TagKind, id: Uuid },
    Row(String),
    Missing,
}

impl From<diesel::result::Error> for TaskWriteFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_write_failure(failure: TaskWriteFailure) -> TaskRepositoryError {
    match failure {
        TaskWriteFailure::Diesel(error) => map_diesel_error(error),
        TaskWriteFailure::UnknownTag { kind, id } => TaskRepositoryError::unknown_tag(kind, id),
        TaskWriteFailure::Row(message) => TaskRepositoryError::query(message),
        TaskWriteFailure::Missing => TaskRepositoryError::query("task vanished during update"),
    }
}

type TagsByTask = HashMap<Uuid, (Vec<TagSummary>, Vec<TagSummary>)>;

async fn load_tags(
    conn: &mut AsyncPgConnection,
    task_ids: &[Uuid],
) -> Result<TagsByTask, TaskWriteFailure> {
    if task_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, TagRow)> = task_tags::table
        .inner_join(tags::table)
        .filter(task_tags::task_id.eq_any(task_ids))
        .order(tags::name.asc())
        .select((task_tags::task_id, TagRow::as_select()))
        .load(conn)
        .await?;

    let mut grouped = TagsByTask::new();
    for (task_id, row) in rows {
        let summary = row.into_summary().map_err(TaskWriteFailure::Row)?;
        let entry = grouped.entry(task_id).or_default();
        match summary.kind {
            TagKind::Category => entry.0.push(summary),
            TagKind::Label => entry.1.push(summary),
        }
    }
    Ok(grouped)
}

async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<TaskRow>,
) -> Result<Vec<Task>, TaskWriteFailure> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut tags = load_tags(conn, &ids).await?;
    collect_rows(
        rows.into_iter().map(|row| {
            let (categories, labels) = tags.remove(&row.id).unwrap_or_default();
            row.into_task(categories, labels)
        }),
        TaskWriteFailure::Row,
    )
}

async fn hydrate_one(
    conn: &mut AsyncPgConnection,
    row: TaskRow,
) -> Result<Task, TaskWriteFailure> {
    hydrate(conn, vec![row])
        .await?
        .pop()
        .ok_or(TaskWriteFailure::Missing)
}

async fn ensure_tags_exist(
    conn: &mut AsyncPgConnection,
    user_id: &Uuid,
    kind: TagKind,
    ids: &[Uuid],
) -> Result<(), TaskWriteFailure> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<Uuid> = tags::table
        .filter(tags::user_id.eq(user_id))
        .filter(tags::kind.eq(kind.as_str()))
        .filter(tags::id.eq_any(ids))
        .select(tags::id)
        .load(conn)
        .await?;
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(TaskWriteFailure::UnknownTag {
            kind,
            id: *missing,
        }),
        None => Ok(()),
    }
}

async fn replace_tags(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
    kind: TagKind,
    ids: &[Uuid],
) -> Result<(), TaskWriteFailure> {
    let same_kind = tags::table
        .filter(tags::kind.eq(kind.as_str()))
        .select(tags::id);
    diesel::delete(
        task_tags::table
            .filter(task_tags::task_id.eq(task_id))
            .filter(task_tags::tag_id.eq_any(same_kind)),
    )
    .execute(conn)
    .await?;

    if ids.is_empty() {
        return Ok(());
    }
    let links: Vec<TaskTagRow> = ids
        .iter()
        .map(|tag_id| TaskTagRow {
            task_id,
            tag_id: *tag_id,
        })
        .collect();
    diesel::insert_into(task_tags::table)
        .values(&links)
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    Ok(())
}

/// Validate and then apply whichever tag lists the assignment carries.
async fn apply_assignment(
    conn: &mut AsyncPgConnection,
    task: &Task,
    assignment: &TagAssignment,
) -> Result<(), TaskWriteFailure> {
    let owner = task.user_id().as_uuid();
    let lists = [
        (TagKind::Category, assignment.categories()),
        (TagKind::Label, assignment.labels()),
    ];
    for (kind, ids) in lists {
        if let Some(ids) = ids {
            ensure_tags_exist(conn, owner, kind, ids).await?;
        }
    }
    for (kind, ids) in lists {
        if let Some(ids) = ids {
            replace_tags(conn, task.id(), kind, ids).await?;
        }
    }
    Ok(())
}

/// Owner-scoped listing with every filter from `query`; boxed so it can be
/// built twice, once for the count and once for the page.
fn filtered<'a>(user_id: &'a Uuid, query: &'a TaskListQuery) -> tasks::BoxedQuery<'a, Pg> {
    let mut statement = tasks::table.filter(tasks::user_id.eq(user_id)).into_boxed();
    if let Some(status) = query.status {
        statement = statement.filter(tasks::status.eq(status.as_str()));
    }
    if !query.priorities.is_empty() {
        let ranks: Vec<i16> = query.priorities.iter().map(|p| p.rank()).collect();
        statement = statement.filter(tasks::priority.eq_any(ranks));
    }
    for (kind, names) in [
        (TagKind::Category, &query.categories),
        (TagKind::Label, &query.labels),
    ] {
        if names.is_empty() {
            continue;
        }
        let tagged = task_tags::table
            .inner_join(tags::table)
            .filter(tags::user_id.eq(user_id))
            .filter(tags::kind.eq(kind.as_str()))
            .filter(tags::name.eq_any(names))
            .select(task_tags::task_id);
        statement = statement.filter(tasks::id.eq_any(tagged));
    }
    statement
}

#[async_trait]
impl TaskRepository for DieselTaskRepository {
    async fn insert(&self, task: &Task, tags: &TagAssignment) -> Result<Task, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, TaskWriteFailure, _>(|conn| {
            async move {
                let row: TaskRow = diesel::insert_into(tasks::table)
                    .values(TaskWriteRow::from_task(task))
                    .returning(TaskRow::as_returning())
                    .get_result(conn)
                    .await?;
                apply_assignment(conn, task, tags).await?;
                hydrate_one(conn, row).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_write_failure)
    }

    async fn update(&self, task: &Task, tags: &TagAssignment) -> Result<Task, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *task.user_id().as_uuid();
        conn.transaction::<_, TaskWriteFailure, _>(|conn| {
            async move {
                let edited = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(task.id()))
                        .filter(tasks::user_id.eq(owner)),
                )
                .set(TaskEditChangeset::from_task(task))
                .execute(conn)
                .await?;
                if edited == 0 {
                    return Err(TaskWriteFailure::Missing);
                }
                // The edit above holds the row lock, so this sees any
                // completion that committed first.
                diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(task.id()))
                        .filter(tasks::user_id.eq(owner))
                        .filter(tasks::status.ne(TaskStatus::Completed.as_str())),
                )
                .set(tasks::xp_value.eq(task.priority().xp_value()))
                .execute(conn)
                .await?;
                apply_assignment(conn, task, tags).await?;
                let row: TaskRow = tasks::table
                    .filter(tasks::id.eq(task.id()))
                    .select(TaskRow::as_select())
                    .first(conn)
                    .await?;
                hydrate_one(conn, row).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_write_failure)
    }

    async fn find(
        &self,
        user_id: &UserId,
        task_id: Uuid,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TaskRow> = tasks::table
            .filter(tasks::id.eq(task_id))
            .filter(tasks::user_id.eq(user_id.as_uuid()))
            .select(TaskRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match row {
            Some(row) => hydrate_one(&mut conn, row)
                .await
                .map(Some)
                .map_err(map_write_failure),
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: &UserId, task_id: Uuid) -> Result<bool, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            tasks::table
                .filter(tasks::id.eq(task_id))
                .filter(tasks::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(
        &self,
        user_id: &UserId,
        query: &TaskListQuery,
    ) -> Result<TaskPage, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = user_id.as_uuid();

        let total: i64 = filtered(owner, query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<TaskRow> = filtered(owner, query)
            .order((
                tasks::due_date.asc().nulls_last(),
                tasks::priority.desc(),
                tasks::created_at.desc(),
            ))
            .limit(to_sql_limit(query.page.limit()))
            .offset(to_sql_limit(query.page.offset()))
            .select(TaskRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let tasks = hydrate(&mut conn, rows).await.map_err(map_write_failure)?;
        Ok(TaskPage {
            tasks,
            total: from_sql_count(total),
        })
    }

    async fn mark_completed(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TaskRow> = diesel::update(
            tasks::table
                .filter(tasks::id.eq(task_id))
                .filter(tasks::user_id.eq(user_id.as_uuid()))
                .filter(tasks::status.ne(TaskStatus::Completed.as_str())),
        )
        .set((
            tasks::status.eq(TaskStatus::Completed.as_str()),
            tasks::completed_at.eq(Some(completed_at)),
            tasks::updated_at.eq(completed_at),
        ))
        .returning(TaskRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match row {
            Some(row) => hydrate_one(&mut conn, row)
                .await
                .map(Some)
                .map_err(map_write_failure),
            None => Ok(None),
        }
    }

    async fn change_status(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        from: TaskStatus,
        to: TaskStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TaskRow> = diesel::update(
            tasks::table
                .filter(tasks::id.eq(task_id))
                .filter(tasks::user_id.eq(user_id.as_uuid()))
                .filter(tasks::status.eq(from.as_str())),
        )
        .set((tasks::status.eq(to.as_str()), tasks::updated_at.eq(at)))
        .returning(TaskRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match row {
            Some(row) => hydrate_one(&mut conn, row)
                .await
                .map(Some)
                .map_err(map_write_failure),
            None => Ok(None),
        }
    }

    async fn revert_completion(
        &self,
        user_id: &UserId,
        task_id: Uuid,
        previous: TaskStatus,
        reverted_at: DateTime<Utc>,
    ) -> Result<(), TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            tasks::table
                .filter(tasks::id.eq(task_id))
                .filter(tasks::user_id.eq(user_id.as_uuid()))
                .filter(tasks::status.eq(TaskStatus::Completed.as_str())),
        )
        .set((
            tasks::status.eq(previous.as_str()),
            tasks::completed_at.eq(None::<DateTime<Utc>>),
            tasks::updated_at.eq(reverted_at),
        ))
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn count_completed(&self, user_id: &UserId) -> Result<u64, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = tasks::table
            .filter(tasks::user_id.eq(user_id.as_uuid()))
            .filter(tasks::status.eq(TaskStatus::Completed.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(from_sql_count(count))
    }

    async fn count_completed_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<u64, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = tasks::table
            .filter(tasks::user_id.eq(user_id.as_uuid()))
            .filter(tasks::status.eq(TaskStatus::Completed.as_str()))
            .filter(tasks::completed_at.ge(window.start()))
            .filter(tasks::completed_at.lt(window.end()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(from_sql_count(count))
    }

    async fn urgent_due_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<UrgentWeekSummary, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let statuses: Vec<String> = tasks::table
            .filter(tasks::user_id.eq(user_id.as_uuid()))
            .filter(tasks::priority.eq(TaskPriority::Urgent.rank()))
            .filter(tasks::due_date.ge(window.start()))
            .filter(tasks::due_date.lt(window.end()))
            .select(tasks::status)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let completed = statuses
            .iter()
            .filter(|status| status.as_str() == TaskStatus::Completed.as_str())
            .count();
        Ok(UrgentWeekSummary {
            total: to_count(statuses.len()),
            completed: to_count(completed),
        })
    }
}
