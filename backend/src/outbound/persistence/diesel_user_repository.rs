//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, STARTING_LEVEL, User, UserCredentials, UserId, Username};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
///
/// Deleting a user relies on `ON DELETE CASCADE` to remove tasks, tags,
/// ledger entries and unlocks in the same statement.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation { constraint } => match constraint.as_deref() {
            Some("users_email_key") => UserPersistenceError::duplicate_email(),
            Some("users_username_key") => UserPersistenceError::duplicate_username(),
            _ => UserPersistenceError::query("unique constraint violated"),
        },
        DieselFailure::ForeignKeyViolation { .. } => {
            UserPersistenceError::query("foreign key violation")
        }
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row.into_user().map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let level = i32::try_from(STARTING_LEVEL).unwrap_or(1);
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_str(),
            email: user.email.as_str(),
            password_hash: &user.password_hash,
            level,
            created_at: user.created_at,
            updated_at: user.created_at,
        };

        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_user(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            let password_hash = row.password_hash.clone();
            to_user(row).map(|user| UserCredentials {
                user,
                password_hash,
            })
        })
        .transpose()
    }

    async fn update_username(
        &self,
        id: &UserId,
        username: &Username,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::username.eq(username.as_str()),
                users::updated_at.eq(updated_at),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage; query behaviour is exercised against the
    //! in-memory adapter in the integration suite.

    use diesel::result::Error as DieselError;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_failures_are_connection_errors() {
        let error = map_pool_error(PoolError::checkout("refused"));
        assert_eq!(error, UserPersistenceError::connection("refused"));
    }

    #[rstest]
    fn missing_rows_are_query_errors() {
        assert!(matches!(
            map_diesel_error(DieselError::NotFound),
            UserPersistenceError::Query { .. }
        ));
    }
}
