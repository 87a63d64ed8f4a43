//! Achievement catalogue and unlocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{AchievementRepository, AchievementRepositoryError};
use crate::domain::{Achievement, AchievementType, EFFICIENCY_MASTER, UnlockedAchievement, UserId};

use super::{MemoryStore, UnlockRecord};

/// Shared prefix of the catalogue ids seeded by the schema migration.
const CATALOGUE_ID_BASE: u128 = 0x6f1c_3a52_0d1e_4a43_9b52_1c7f_0a00_0000;

fn entry(
    seq: u128,
    name: &str,
    description: &str,
    achievement_type: AchievementType,
    requirement_value: Option<i32>,
) -> Achievement {
    Achievement {
        id: Uuid::from_u128(CATALOGUE_ID_BASE + seq),
        name: name.to_owned(),
        description: description.to_owned(),
        achievement_type,
        requirement_value,
    }
}

/// The nine built-in achievements, identical to the migration seed and
/// ordered by type then requirement.
#[must_use]
pub fn seeded_catalogue() -> Vec<Achievement> {
    use AchievementType::{LevelMilestone, Special, TaskMilestone};
    vec![
        entry(1, "First Steps", "Complete your first task", TaskMilestone, Some(1)),
        entry(2, "Task Apprentice", "Complete 10 tasks", TaskMilestone, Some(10)),
        entry(3, "Task Master", "Complete 50 tasks", TaskMilestone, Some(50)),
        entry(4, "Centurion", "Complete 100 tasks", TaskMilestone, Some(100)),
        entry(5, "Rising Star", "Reach level 5", LevelMilestone, Some(5)),
        entry(6, "Seasoned Adventurer", "Reach level 10", LevelMilestone, Some(10)),
        entry(7, "Veteran", "Reach level 20", LevelMilestone, Some(20)),
        entry(8, "Legend", "Reach level 30", LevelMilestone, Some(30)),
        entry(
            9,
            EFFICIENCY_MASTER,
            "Complete every urgent task due this week",
            Special,
            None,
        ),
    ]
}

#[async_trait]
impl AchievementRepository for MemoryStore {
    async fn catalogue(&self) -> Result<Vec<Achievement>, AchievementRepositoryError> {
        Ok(self.lock().catalogue.clone())
    }

    async fn unlocked_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UnlockedAchievement>, AchievementRepositoryError> {
        let state = self.lock();
        let mut unlocked: Vec<UnlockedAchievement> = state
            .unlocks
            .iter()
            .filter(|unlock| &unlock.user_id == user_id.as_uuid())
            .filter_map(|unlock| {
                state
                    .catalogue
                    .iter()
                    .find(|achievement| achievement.id == unlock.achievement_id)
                    .map(|achievement| UnlockedAchievement {
                        achievement: achievement.clone(),
                        unlocked_at: unlock.unlocked_at,
                    })
            })
            .collect();
        unlocked.sort_by(|a, b| {
            b.unlocked_at
                .cmp(&a.unlocked_at)
                .then_with(|| a.achievement.id.cmp(&b.achievement.id))
        });
        Ok(unlocked)
    }

    async fn unlock(
        &self,
        user_id: &UserId,
        achievement_id: Uuid,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, AchievementRepositoryError> {
        let mut state = self.lock();
        if !state.users.contains_key(user_id.as_uuid())
            || !state.catalogue.iter().any(|a| a.id == achievement_id)
        {
            return Err(AchievementRepositoryError::query("unknown user or achievement"));
        }
        let owner = *user_id.as_uuid();
        let exists = state
            .unlocks
            .iter()
            .any(|unlock| unlock.user_id == owner && unlock.achievement_id == achievement_id);
        if exists {
            return Ok(false);
        }
        state.unlocks.push(UnlockRecord {
            user_id: owner,
            achievement_id,
            unlocked_at,
        });
        Ok(true)
    }
}
