//! PostgreSQL-backed achievement catalogue and unlock store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AchievementRepository, AchievementRepositoryError};
use crate::domain::{Achievement, UnlockedAchievement, UserId};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, collect_rows, pool_error_message};
use super::models::{AchievementRow, NewUserAchievementRow};
use super::pool::{DbPool, PoolError};
use super::schema::{achievements, user_achievements};

/// Diesel-backed implementation of the `AchievementRepository` port.
#[derive(Clone)]
pub struct DieselAchievementRepository {
    pool: DbPool,
}

impl DieselAchievementRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AchievementRepositoryError {
    AchievementRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> AchievementRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => AchievementRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            AchievementRepositoryError::query("unique constraint violated")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            AchievementRepositoryError::query("unknown user or achievement")
        }
        DieselFailure::Query(message) => AchievementRepositoryError::query(message),
    }
}

/// Catalogue order: evaluation type first, then ascending requirement.
fn sort_catalogue(catalogue: &mut [Achievement]) {
    catalogue.sort_by_key(|achievement| (achievement.achievement_type, achievement.requirement_value));
}

#[async_trait]
impl AchievementRepository for DieselAchievementRepository {
    async fn catalogue(&self) -> Result<Vec<Achievement>, AchievementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AchievementRow> = achievements::table
            .select(AchievementRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut catalogue = collect_rows(
            rows.into_iter().map(AchievementRow::into_achievement),
            AchievementRepositoryError::query,
        )?;
        sort_catalogue(&mut catalogue);
        Ok(catalogue)
    }

    async fn unlocked_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UnlockedAchievement>, AchievementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(AchievementRow, DateTime<Utc>)> = user_achievements::table
            .inner_join(achievements::table)
            .filter(user_achievements::user_id.eq(user_id.as_uuid()))
            .order((
                user_achievements::unlocked_at.desc(),
                user_achievements::achievement_id.asc(),
            ))
            .select((AchievementRow::as_select(), user_achievements::unlocked_at))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(|(row, unlocked_at)| {
                row.into_achievement().map(|achievement| UnlockedAchievement {
                    achievement,
                    unlocked_at,
                })
            }),
            AchievementRepositoryError::query,
        )
    }

    async fn unlock(
        &self,
        user_id: &UserId,
        achievement_id: Uuid,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool, AchievementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserAchievementRow {
            user_id: *user_id.as_uuid(),
            achievement_id,
            unlocked_at,
        };
        let inserted = diesel::insert_into(user_achievements::table)
            .values(&row)
            .on_conflict((user_achievements::user_id, user_achievements::achievement_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::AchievementType;

    fn entry(name: &str, achievement_type: AchievementType, requirement: Option<i32>) -> Achievement {
        Achievement {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: String::new(),
            achievement_type,
            requirement_value: requirement,
        }
    }

    #[rstest]
    fn catalogue_sorts_by_type_then_requirement() {
        let mut catalogue = vec![
            entry("Efficiency Master", AchievementType::Special, None),
            entry("Veteran", AchievementType::LevelMilestone, Some(20)),
            entry("Task Apprentice", AchievementType::TaskMilestone, Some(10)),
            entry("First Steps", AchievementType::TaskMilestone, Some(1)),
        ];
        sort_catalogue(&mut catalogue);
        let names: Vec<_> = catalogue.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            ["First Steps", "Task Apprentice", "Veteran", "Efficiency Master"]
        );
    }

    #[rstest]
    fn pool_failures_are_connection_errors() {
        assert_eq!(
            map_pool_error(PoolError::checkout("refused")),
            AchievementRepositoryError::connection("refused")
        );
    }
}
