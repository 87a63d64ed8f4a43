//! Accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, STARTING_LEVEL, User, UserCredentials, UserId, Username};

use super::{MemoryStore, UserRecord};

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.lock();
        if state.users.values().any(|row| row.user.email == user.email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        if state
            .users
            .values()
            .any(|row| row.user.username == user.username)
        {
            return Err(UserPersistenceError::duplicate_username());
        }
        let stored = User {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            level: STARTING_LEVEL,
            created_at: user.created_at,
        };
        state.users.insert(
            *user.id.as_uuid(),
            UserRecord {
                user: stored.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .get(id.as_uuid())
            .map(|row| row.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|row| &row.user.email == email)
            .map(|row| UserCredentials {
                user: row.user.clone(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn update_username(
        &self,
        id: &UserId,
        username: &Username,
        _updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock();
        let taken = state
            .users
            .values()
            .any(|row| &row.user.username == username && &row.user.id != id);
        if taken {
            return Err(UserPersistenceError::duplicate_username());
        }
        Ok(state.users.get_mut(id.as_uuid()).map(|row| {
            row.user.username = username.clone();
            row.user.clone()
        }))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock();
        if state.users.remove(id.as_uuid()).is_none() {
            return Ok(false);
        }
        state.cascade_user(id.as_uuid());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::outbound::memory::test_fixtures::{new_user, register};

    #[rstest]
    #[tokio::test]
    async fn created_users_start_at_level_one() {
        let store = MemoryStore::new();
        let user = register(&store, "ada").await;
        assert_eq!(user.level, STARTING_LEVEL);
        let found = store.find_by_id(&user.id).await.expect("lookup");
        assert_eq!(found, Some(user));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_emails_win_over_duplicate_usernames() {
        let store = MemoryStore::new();
        register(&store, "ada").await;
        let error = store
            .create(&new_user("ada"))
            .await
            .expect_err("duplicate");
        assert_eq!(error, UserPersistenceError::duplicate_email());
    }

    #[rstest]
    #[tokio::test]
    async fn renaming_onto_a_taken_username_fails() {
        let store = MemoryStore::new();
        register(&store, "ada").await;
        let grace = register(&store, "grace").await;
        let taken = Username::new("ada").expect("valid username");
        let error = store
            .update_username(&grace.id, &taken, grace.created_at)
            .await
            .expect_err("taken");
        assert_eq!(error, UserPersistenceError::duplicate_username());
    }

    #[rstest]
    #[tokio::test]
    async fn credentials_are_found_by_email() {
        let store = MemoryStore::new();
        let user = register(&store, "ada").await;
        let credentials = store
            .find_credentials_by_email(&user.email)
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(credentials.password_hash, "$argon2id$fixture");
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_twice_reports_absence() {
        let store = MemoryStore::new();
        let user = register(&store, "ada").await;
        assert!(store.delete(&user.id).await.expect("delete"));
        assert!(!store.delete(&user.id).await.expect("delete"));
    }
}
