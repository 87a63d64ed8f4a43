//! Tests for profile reads and account changes.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockAchievementRepository, MockTaskRepository, MockUserRepository, MockXpLedgerRepository,
    UserPersistenceError,
};
use crate::domain::{Email, ErrorCode, MAX_LEVEL, UnlockedAchievement};
use crate::test_support::{FixedClock, wednesday_at};

type Service = UserProfileService<
    MockUserRepository,
    MockXpLedgerRepository,
    MockTaskRepository,
    MockAchievementRepository,
>;

struct Doubles {
    users: MockUserRepository,
    ledger: MockXpLedgerRepository,
    tasks: MockTaskRepository,
    achievements: MockAchievementRepository,
}

impl Doubles {
    fn build(self) -> Service {
        UserProfileService::new(
            Arc::new(self.users),
            Arc::new(self.ledger),
            Arc::new(self.tasks),
            Arc::new(self.achievements),
            Arc::new(FixedClock::new(wednesday_at(12))),
        )
    }
}

fn user(id: &UserId, level: u32) -> User {
    User {
        id: id.clone(),
        username: Username::new("hero").expect("valid username"),
        email: Email::new("hero@example.com").expect("valid email"),
        level,
        created_at: wednesday_at(1),
    }
}

#[fixture]
fn doubles() -> Doubles {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|id| Ok(Some(user(id, 2))));
    Doubles {
        users,
        ledger: MockXpLedgerRepository::new(),
        tasks: MockTaskRepository::new(),
        achievements: MockAchievementRepository::new(),
    }
}

fn stats_doubles(mut doubles: Doubles, total: i64) -> Doubles {
    doubles
        .ledger
        .expect_total_for_user()
        .returning(move |_| Ok(total));
    doubles.ledger.expect_sum_within().returning(|_, _| Ok(42));
    doubles
        .ledger
        .expect_latest_with_description()
        .withf(|_, description| description == DAILY_LOGIN_DESCRIPTION)
        .returning(|_, _| Ok(Some(wednesday_at(8))));
    doubles.tasks.expect_count_completed().returning(|_| Ok(9));
    doubles
        .tasks
        .expect_count_completed_within()
        .returning(|_, _| Ok(3));
    doubles
        .achievements
        .expect_unlocked_for_user()
        .returning(|_| Ok(Vec::<UnlockedAchievement>::new()));
    doubles
}

#[rstest]
#[tokio::test]
async fn stats_combine_ledger_tasks_and_week(doubles: Doubles) {
    let stats = stats_doubles(doubles, 300)
        .build()
        .stats(&UserId::random())
        .await
        .expect("stats succeed");

    assert_eq!(stats.level, 3);
    assert_eq!(stats.total_xp, 300);
    assert_eq!(stats.xp_to_next_level, Some(200));
    assert_eq!(stats.level_progress.xp_into_level, 50);
    assert_eq!(stats.completed_task_count, 9);
    assert_eq!(stats.achievements_count, 0);
    assert_eq!(stats.weekly_activity.tasks_completed_this_week, 3);
    assert_eq!(stats.weekly_activity.xp_earned_this_week, 42);
    assert_eq!(stats.weekly_activity.last_login_date, Some(wednesday_at(8)));
}

#[rstest]
#[tokio::test]
async fn stats_at_max_level_have_no_next_level(doubles: Doubles) {
    let stats = stats_doubles(doubles, 1_000_000)
        .build()
        .stats(&UserId::random())
        .await
        .expect("stats succeed");
    assert_eq!(stats.level, MAX_LEVEL);
    assert_eq!(stats.xp_to_next_level, None);
}

#[rstest]
#[case(0)]
#[case(101)]
#[tokio::test]
async fn history_limit_is_bounded(doubles: Doubles, #[case] limit: u32) {
    let error = doubles
        .build()
        .xp_history(&UserId::random(), limit)
        .await
        .expect_err("limit out of range");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
        Some("limit")
    );
}

#[rstest]
#[tokio::test]
async fn history_passes_limit_through(mut doubles: Doubles) {
    doubles
        .ledger
        .expect_list_recent()
        .withf(|_, limit| *limit == 20)
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    let entries = doubles
        .build()
        .xp_history(&UserId::random(), 20)
        .await
        .expect("history succeeds");
    assert!(entries.is_empty());
}

#[rstest]
#[tokio::test]
async fn taken_username_conflicts(mut doubles: Doubles) {
    doubles
        .users
        .expect_update_username()
        .returning(|_, _, _| Err(UserPersistenceError::duplicate_username()));
    let error = doubles
        .build()
        .update_username(&UserId::random(), Username::new("taken").expect("valid"))
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn rename_returns_fresh_profile(mut doubles: Doubles) {
    doubles
        .users
        .expect_update_username()
        .returning(|id, username, _| {
            let mut renamed = user(id, 2);
            renamed.username = username.clone();
            Ok(Some(renamed))
        });
    doubles.ledger.expect_total_for_user().returning(|_| Ok(120));
    let profile = doubles
        .build()
        .update_username(&UserId::random(), Username::new("new_name").expect("valid"))
        .await
        .expect("rename succeeds");
    assert_eq!(profile.username.as_str(), "new_name");
    assert_eq!(profile.total_xp, 120);
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_account_is_not_found(mut doubles: Doubles) {
    doubles.users.expect_delete().returning(|_| Ok(false));
    let error = doubles
        .build()
        .delete_account(&UserId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
