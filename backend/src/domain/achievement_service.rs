//! Achievement evaluation and reads.
//!
//! One service implements both the command port (unlocking) and the query
//! port (catalogue, unlocks, progress). Both read the same
//! [`AchievementCounters`] snapshot so displayed progress never disagrees with
//! the unlock rules.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    AchievementCommand, AchievementQuery, AchievementRepository, TaskRepository, UserRepository,
};
use crate::domain::service_support::{map_achievement_error, map_task_error, map_user_error};
use crate::domain::{
    Achievement, AchievementCounters, AchievementProgress, Error, TimeWindow,
    UnlockedAchievement, UserId,
};

/// Achievement service implementing [`AchievementCommand`] and
/// [`AchievementQuery`].
#[derive(Clone)]
pub struct AchievementService<A, T, U> {
    achievements: Arc<A>,
    tasks: Arc<T>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<A, T, U> AchievementService<A, T, U> {
    /// Create a service over the achievement, task, and user repositories.
    pub fn new(
        achievements: Arc<A>,
        tasks: Arc<T>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            achievements,
            tasks,
            users,
            clock,
        }
    }
}

impl<A, T, U> AchievementService<A, T, U>
where
    A: AchievementRepository,
    T: TaskRepository,
    U: UserRepository,
{
    async fn counters(&self, user_id: &UserId) -> Result<AchievementCounters, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let completed_tasks = self
            .tasks
            .count_completed(user_id)
            .await
            .map_err(map_task_error)?;
        let week = TimeWindow::week_containing(self.clock.utc());
        let urgent_this_week = self
            .tasks
            .urgent_due_within(user_id, week)
            .await
            .map_err(map_task_error)?;
        Ok(AchievementCounters {
            completed_tasks,
            level: user.level,
            urgent_this_week,
        })
    }

    async fn unlock_times(
        &self,
        user_id: &UserId,
    ) -> Result<HashMap<Uuid, DateTime<Utc>>, Error> {
        let unlocked = self
            .achievements
            .unlocked_for_user(user_id)
            .await
            .map_err(map_achievement_error)?;
        Ok(unlocked
            .into_iter()
            .map(|entry| (entry.achievement.id, entry.unlocked_at))
            .collect())
    }
}

#[async_trait]
impl<A, T, U> AchievementCommand for AchievementService<A, T, U>
where
    A: AchievementRepository,
    T: TaskRepository,
    U: UserRepository,
{
    async fn check_and_award(&self, user_id: &UserId) -> Result<Vec<Achievement>, Error> {
        let catalogue = self
            .achievements
            .catalogue()
            .await
            .map_err(map_achievement_error)?;
        let already_unlocked = self.unlock_times(user_id).await?;
        let counters = self.counters(user_id).await?;
        let now = self.clock.utc();

        let mut newly_unlocked = Vec::new();
        for achievement in catalogue {
            if already_unlocked.contains_key(&achievement.id) || !counters.qualifies(&achievement)
            {
                continue;
            }
            match self.achievements.unlock(user_id, achievement.id, now).await {
                Ok(true) => {
                    info!(
                        user_id = %user_id,
                        achievement = %achievement.name,
                        "achievement unlocked"
                    );
                    newly_unlocked.push(achievement);
                }
                Ok(false) => {}
                Err(error) => {
                    warn!(
                        user_id = %user_id,
                        achievement = %achievement.name,
                        %error,
                        "achievement unlock failed; will retry on next check"
                    );
                }
            }
        }
        Ok(newly_unlocked)
    }
}

#[async_trait]
impl<A, T, U> AchievementQuery for AchievementService<A, T, U>
where
    A: AchievementRepository,
    T: TaskRepository,
    U: UserRepository,
{
    async fn catalogue(&self) -> Result<Vec<Achievement>, Error> {
        self.achievements
            .catalogue()
            .await
            .map_err(map_achievement_error)
    }

    async fn unlocked(&self, user_id: &UserId) -> Result<Vec<UnlockedAchievement>, Error> {
        self.achievements
            .unlocked_for_user(user_id)
            .await
            .map_err(map_achievement_error)
    }

    async fn progress(&self, user_id: &UserId) -> Result<Vec<AchievementProgress>, Error> {
        let catalogue = self
            .achievements
            .catalogue()
            .await
            .map_err(map_achievement_error)?;
        let unlocked = self.unlock_times(user_id).await?;
        let counters = self.counters(user_id).await?;
        Ok(catalogue
            .into_iter()
            .map(|achievement| {
                let unlocked_at = unlocked.get(&achievement.id).copied();
                AchievementProgress::evaluate(achievement, unlocked_at, &counters)
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "achievement_service_tests.rs"]
mod tests;
