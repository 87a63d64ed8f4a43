//! Account reads and changes: profile, stats, XP history, rename, delete.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AchievementRepository, TaskRepository, UserProfile, UserProfileCommand, UserProfileQuery,
    UserRepository, UserStats, WeeklyActivity, XP_HISTORY_MAX_LIMIT, XpLedgerRepository,
};
use crate::domain::service_support::{
    invalid_field, map_achievement_error, map_ledger_error, map_task_error, map_user_error,
    to_count,
};
use crate::domain::{
    DAILY_LOGIN_DESCRIPTION, Error, TimeWindow, User, UserId, Username, XpLedgerEntry,
    progress_within_level,
};

/// Profile service implementing [`UserProfileQuery`] and
/// [`UserProfileCommand`].
#[derive(Clone)]
pub struct UserProfileService<U, L, T, A> {
    users: Arc<U>,
    ledger: Arc<L>,
    tasks: Arc<T>,
    achievements: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<U, L, T, A> UserProfileService<U, L, T, A> {
    /// Create a service over the repositories it aggregates.
    pub fn new(
        users: Arc<U>,
        ledger: Arc<L>,
        tasks: Arc<T>,
        achievements: Arc<A>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            ledger,
            tasks,
            achievements,
            clock,
        }
    }
}

impl<U, L, T, A> UserProfileService<U, L, T, A>
where
    U: UserRepository,
    L: XpLedgerRepository,
{
    async fn user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn total_xp(&self, user_id: &UserId) -> Result<i64, Error> {
        self.ledger
            .total_for_user(user_id)
            .await
            .map_err(map_ledger_error)
    }
}

#[async_trait]
impl<U, L, T, A> UserProfileQuery for UserProfileService<U, L, T, A>
where
    U: UserRepository,
    L: XpLedgerRepository,
    T: TaskRepository,
    A: AchievementRepository,
{
    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        let user = self.user(user_id).await?;
        let total = self.total_xp(user_id).await?;
        Ok(UserProfile::from_user(user, total))
    }

    async fn stats(&self, user_id: &UserId) -> Result<UserStats, Error> {
        // Existence check; the level itself is derived from the ledger total.
        self.user(user_id).await?;
        let total_xp = self.total_xp(user_id).await?;
        let level_progress = progress_within_level(total_xp);

        let completed_task_count = self
            .tasks
            .count_completed(user_id)
            .await
            .map_err(map_task_error)?;
        let achievements_count = to_count(
            self.achievements
                .unlocked_for_user(user_id)
                .await
                .map_err(map_achievement_error)?
                .len(),
        );

        let week = TimeWindow::week_containing(self.clock.utc());
        let tasks_completed_this_week = self
            .tasks
            .count_completed_within(user_id, week)
            .await
            .map_err(map_task_error)?;
        let xp_earned_this_week = self
            .ledger
            .sum_within(user_id, week)
            .await
            .map_err(map_ledger_error)?;
        let last_login_date = self
            .ledger
            .latest_with_description(user_id, DAILY_LOGIN_DESCRIPTION)
            .await
            .map_err(map_ledger_error)?;

        Ok(UserStats {
            level: level_progress.level,
            total_xp,
            xp_to_next_level: level_progress.xp_to_next_level,
            level_progress,
            completed_task_count,
            achievements_count,
            weekly_activity: WeeklyActivity {
                tasks_completed_this_week,
                xp_earned_this_week,
                last_login_date,
            },
        })
    }

    async fn xp_history(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<XpLedgerEntry>, Error> {
        if !(1..=XP_HISTORY_MAX_LIMIT).contains(&limit) {
            return Err(invalid_field(
                "limit",
                format!("limit must be between 1 and {XP_HISTORY_MAX_LIMIT}"),
            ));
        }
        self.ledger
            .list_recent(user_id, limit)
            .await
            .map_err(map_ledger_error)
    }
}

#[async_trait]
impl<U, L, T, A> UserProfileCommand for UserProfileService<U, L, T, A>
where
    U: UserRepository,
    L: XpLedgerRepository,
    T: TaskRepository,
    A: AchievementRepository,
{
    async fn update_username(
        &self,
        user_id: &UserId,
        username: Username,
    ) -> Result<UserProfile, Error> {
        let user = self
            .users
            .update_username(user_id, &username, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let total = self.total_xp(user_id).await?;
        Ok(UserProfile::from_user(user, total))
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error> {
        let deleted = self.users.delete(user_id).await.map_err(map_user_error)?;
        if !deleted {
            return Err(Error::not_found("user not found"));
        }
        info!(user_id = %user_id, "account deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_profile_service_tests.rs"]
mod tests;
