//! Registration and login service.
//!
//! Bonus awards are best effort: an account is created, and a login
//! succeeds, even when the XP ledger rejects the bonus.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;

use crate::domain::ports::{
    AuthCommand, LoginResponse, PasswordHasher, RegisterResponse, UserProfile, UserRepository,
    XpCommand, XpLedgerRepository,
};
use crate::domain::service_support::{map_hash_error, map_ledger_error, map_user_error};
use crate::domain::{
    Error, LoginCredentials, NewUser, Registration, STARTING_LEVEL, UserId, XpAwardOutcome,
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Authentication service implementing [`AuthCommand`].
#[derive(Clone)]
pub struct AuthService<U, L> {
    users: Arc<U>,
    ledger: Arc<L>,
    hasher: Arc<dyn PasswordHasher>,
    xp: Arc<dyn XpCommand>,
    clock: Arc<dyn Clock>,
}

impl<U, L> AuthService<U, L> {
    /// Create a service from its collaborators.
    pub fn new(
        users: Arc<U>,
        ledger: Arc<L>,
        hasher: Arc<dyn PasswordHasher>,
        xp: Arc<dyn XpCommand>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            ledger,
            hasher,
            xp,
            clock,
        }
    }
}

#[async_trait]
impl<U, L> AuthCommand for AuthService<U, L>
where
    U: UserRepository,
    L: XpLedgerRepository,
{
    async fn register(&self, registration: Registration) -> Result<RegisterResponse, Error> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hash_error)?;
        let new_user = NewUser {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            password_hash,
            created_at: self.clock.utc(),
        };
        let mut user = self.users.create(&new_user).await.map_err(map_user_error)?;

        let xp = match self.xp.award_registration_bonus(&user.id).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(user_id = %user.id, %error, "registration bonus skipped");
                XpAwardOutcome::unchanged(0, STARTING_LEVEL)
            }
        };
        user.level = xp.new_level;

        Ok(RegisterResponse {
            user: UserProfile::from_user(user, xp.new_total_xp),
            xp,
        })
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<LoginResponse, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let mut user = stored.user;
        match self.xp.award_daily_login_bonus(&user.id).await {
            Ok(bonus) => {
                user.level = bonus.outcome.new_level;
                Ok(LoginResponse {
                    user: UserProfile::from_user(user, bonus.outcome.new_total_xp),
                    bonus_awarded: bonus.awarded,
                    leveled_up: bonus.outcome.leveled_up,
                })
            }
            Err(error) => {
                warn!(user_id = %user.id, %error, "daily login bonus skipped");
                let total = self
                    .ledger
                    .total_for_user(&user.id)
                    .await
                    .map_err(map_ledger_error)?;
                Ok(LoginResponse {
                    user: UserProfile::from_user(user, total),
                    bonus_awarded: false,
                    leveled_up: false,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
