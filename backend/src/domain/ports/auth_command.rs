//! Driving port for registration and login.
//!
//! Inbound adapters call this port to create accounts and check credentials
//! without importing persistence or hashing infrastructure. Session handling
//! stays in the adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, Registration, XpAwardOutcome};

use super::UserProfile;

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// The new account.
    pub user: UserProfile,
    /// Totals after the registration bonus.
    pub xp: XpAwardOutcome,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The authenticated account, reflecting any bonus just awarded.
    pub user: UserProfile,
    /// Whether this login earned the daily bonus.
    pub bonus_awarded: bool,
    /// Whether the bonus moved the user up a level.
    pub leveled_up: bool,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Create an account and award the registration bonus.
    async fn register(&self, registration: Registration) -> Result<RegisterResponse, Error>;

    /// Verify credentials and apply the daily login bonus.
    ///
    /// Unknown emails and wrong passwords fail with the same unauthorised
    /// error.
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginResponse, Error>;
}
