//! Port abstraction for account persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Email, NewUser, User, UserCredentials, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername => "username is already taken",
        /// Another account already uses the email address.
        DuplicateEmail => "email is already registered",
    }
}

/// Port for reading and writing accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account at the starting level.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account and its password hash by login email.
    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Change the username; `None` when the account does not exist.
    async fn update_username(
        &self,
        id: &UserId,
        username: &Username,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Delete the account and everything it owns.
    ///
    /// Returns `false` when no account matched.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
