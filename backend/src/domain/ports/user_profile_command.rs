//! Driving port for account changes.

use async_trait::async_trait;

use crate::domain::{Error, UserId, Username};

use super::UserProfile;

/// Domain use-case port for account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileCommand: Send + Sync {
    /// Change the caller's username.
    async fn update_username(
        &self,
        user_id: &UserId,
        username: Username,
    ) -> Result<UserProfile, Error>;

    /// Delete the caller's account and everything it owns.
    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error>;
}
