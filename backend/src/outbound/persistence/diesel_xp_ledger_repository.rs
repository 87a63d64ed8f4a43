//! PostgreSQL-backed XP ledger.
//!
//! Every award runs in one transaction that starts with
//! `SELECT level FROM users WHERE id = $1 FOR UPDATE`. The row lock
//! serialises concurrent awards for the same user, so the recomputed total
//! and cached level always reflect every committed entry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{XpLedgerRepository, XpLedgerRepositoryError};
use crate::domain::{TimeWindow, UserId, XpAward, XpAwardOutcome, XpLedgerEntry, level_for};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, pool_error_message, to_sql_limit,
};
use super::models::{NewXpLedgerRow, XpLedgerRow};
use super::pool::{DbPool, PoolError};
use super::schema::{users, xp_ledger};

/// Diesel-backed implementation of the `XpLedgerRepository` port.
#[derive(Clone)]
pub struct DieselXpLedgerRepository {
    pool: DbPool,
}

impl DieselXpLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> XpLedgerRepositoryError {
    XpLedgerRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> XpLedgerRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => XpLedgerRepositoryError::connection(message),
        DieselFailure::ForeignKeyViolation { .. } => XpLedgerRepositoryError::unknown_user(),
        DieselFailure::UniqueViolation { .. } => {
            XpLedgerRepositoryError::query("unique constraint violated")
        }
        DieselFailure::Query(message) => XpLedgerRepositoryError::query(message),
    }
}

/// Failure inside the award transaction.
#[derive(Debug)]
enum AwardFailure {
    Diesel(diesel::result::Error),
    UnknownUser,
}

impl From<diesel::result::Error> for AwardFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_award_failure(failure: AwardFailure) -> XpLedgerRepositoryError {
    match failure {
        AwardFailure::Diesel(error) => map_diesel_error(error),
        AwardFailure::UnknownUser => XpLedgerRepositoryError::unknown_user(),
    }
}

fn level_to_db(level: u32) -> i32 {
    i32::try_from(level).unwrap_or(i32::MAX)
}

async fn lock_user_level(
    conn: &mut AsyncPgConnection,
    user_id: &Uuid,
) -> Result<u32, AwardFailure> {
    let locked: Option<i32> = users::table
        .filter(users::id.eq(user_id))
        .select(users::level)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let level = locked.ok_or(AwardFailure::UnknownUser)?;
    Ok(u32::try_from(level).unwrap_or(1))
}

async fn sum_for_user(conn: &mut AsyncPgConnection, user_id: &Uuid) -> QueryResult<i64> {
    let total: Option<i64> = xp_ledger::table
        .filter(xp_ledger::user_id.eq(user_id))
        .select(sum(xp_ledger::xp_value))
        .first(conn)
        .await?;
    Ok(total.unwrap_or(0))
}

/// Append `award`, recompute the total and store the derived level.
async fn append_locked(
    conn: &mut AsyncPgConnection,
    award: &XpAward,
    previous_level: u32,
    awarded_at: DateTime<Utc>,
) -> Result<XpAwardOutcome, AwardFailure> {
    let user_id = *award.user_id.as_uuid();
    let row = NewXpLedgerRow {
        id: Uuid::new_v4(),
        user_id,
        xp_value: award.xp_value,
        description: &award.description,
        related_task_id: award.related_task_id,
        created_at: awarded_at,
    };
    diesel::insert_into(xp_ledger::table)
        .values(&row)
        .execute(conn)
        .await?;

    let total = sum_for_user(conn, &user_id).await?;
    let new_level = level_for(total);
    if new_level != previous_level {
        diesel::update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::level.eq(level_to_db(new_level)),
                users::updated_at.eq(awarded_at),
            ))
            .execute(conn)
            .await?;
    }
    Ok(XpAwardOutcome::from_levels(total, previous_level, new_level))
}

#[async_trait]
impl XpLedgerRepository for DieselXpLedgerRepository {
    async fn award(
        &self,
        award: &XpAward,
        awarded_at: DateTime<Utc>,
    ) -> Result<XpAwardOutcome, XpLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, AwardFailure, _>(|conn| {
            async move {
                let previous = lock_user_level(conn, award.user_id.as_uuid()).await?;
                append_locked(conn, award, previous, awarded_at).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_award_failure)
    }

    async fn award_once_within(
        &self,
        award: &XpAward,
        window: TimeWindow,
        awarded_at: DateTime<Utc>,
    ) -> Result<Option<XpAwardOutcome>, XpLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, AwardFailure, _>(|conn| {
            async move {
                let user_id = award.user_id.as_uuid();
                let previous = lock_user_level(conn, user_id).await?;
                let existing: i64 = xp_ledger::table
                    .filter(xp_ledger::user_id.eq(user_id))
                    .filter(xp_ledger::description.eq(&award.description))
                    .filter(xp_ledger::created_at.ge(window.start()))
                    .filter(xp_ledger::created_at.lt(window.end()))
                    .count()
                    .get_result(conn)
                    .await?;
                if existing > 0 {
                    return Ok(None);
                }
                append_locked(conn, award, previous, awarded_at)
                    .await
                    .map(Some)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_award_failure)
    }

    async fn total_for_user(&self, user_id: &UserId) -> Result<i64, XpLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sum_for_user(&mut conn, user_id.as_uuid())
            .await
            .map_err(map_diesel_error)
    }

    async fn sum_within(
        &self,
        user_id: &UserId,
        window: TimeWindow,
    ) -> Result<i64, XpLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: Option<i64> = xp_ledger::table
            .filter(xp_ledger::user_id.eq(user_id.as_uuid()))
            .filter(xp_ledger::created_at.ge(window.start()))
            .filter(xp_ledger::created_at.lt(window.end()))
            .select(sum(xp_ledger::xp_value))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(total.unwrap_or(0))
    }

    async fn latest_with_description(
        &self,
        user_id: &UserId,
        description: &str,
    ) -> Result<Option<DateTime<Utc>>, XpLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        xp_ledger::table
            .filter(xp_ledger::user_id.eq(user_id.as_uuid()))
            .filter(xp_ledger::description.eq(description))
            .order(xp_ledger::created_at.desc())
            .select(xp_ledger::created_at)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<XpLedgerEntry>, XpLedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<XpLedgerRow> = xp_ledger::table
            .filter(xp_ledger::user_id.eq(user_id.as_uuid()))
            .order((xp_ledger::created_at.desc(), xp_ledger::id.desc()))
            .limit(to_sql_limit(limit))
            .select(XpLedgerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(XpLedgerEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use diesel::result::Error as DieselError;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn unknown_users_survive_the_transaction_boundary() {
        assert_eq!(
            map_award_failure(AwardFailure::UnknownUser),
            XpLedgerRepositoryError::unknown_user()
        );
    }

    #[rstest]
    fn diesel_failures_map_to_query_errors() {
        assert!(matches!(
            map_award_failure(AwardFailure::from(DieselError::NotFound)),
            XpLedgerRepositoryError::Query { .. }
        ));
    }

    #[rstest]
    #[case(1, 1)]
    #[case(30, 30)]
    fn levels_fit_the_column(#[case] level: u32, #[case] expected: i32) {
        assert_eq!(level_to_db(level), expected);
    }
}
