//! Achievement catalogue entries and the rules that unlock them.
//!
//! Evaluation is pure: callers gather an [`AchievementCounters`] snapshot and
//! ask which catalogue entries qualify. Persistence of unlocks lives behind
//! the achievement repository port.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the weekly urgent-task achievement.
pub const EFFICIENCY_MASTER: &str = "Efficiency Master";

/// How an achievement is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    /// Completed-task count reaches the requirement.
    TaskMilestone,
    /// Level reaches the requirement.
    LevelMilestone,
    /// Bespoke rule keyed by achievement name.
    Special,
}

impl AchievementType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskMilestone => "task_milestone",
            Self::LevelMilestone => "level_milestone",
            Self::Special => "special",
        }
    }
}

impl fmt::Display for AchievementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_milestone" => Ok(Self::TaskMilestone),
            "level_milestone" => Ok(Self::LevelMilestone),
            "special" => Ok(Self::Special),
            other => Err(format!("unknown achievement type {other}")),
        }
    }
}

/// Static catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    /// Catalogue identifier.
    pub id: Uuid,
    /// Display name; also the key for special rules.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Evaluation rule.
    pub achievement_type: AchievementType,
    /// Threshold for milestone types.
    pub requirement_value: Option<i32>,
}

/// Achievement unlocked by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    /// Catalogue entry.
    #[serde(flatten)]
    pub achievement: Achievement,
    /// First unlock time.
    pub unlocked_at: DateTime<Utc>,
}

/// Urgent tasks due in the current week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrgentWeekSummary {
    /// Urgent tasks due this week.
    pub total: u64,
    /// Of those, how many are completed.
    pub completed: u64,
}

impl UrgentWeekSummary {
    /// At least one urgent task is due this week and every one is done.
    #[must_use]
    pub const fn all_completed(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// Counters an evaluation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementCounters {
    /// Completed tasks across all time.
    pub completed_tasks: u64,
    /// Current level.
    pub level: u32,
    /// Urgent tasks due in the current week.
    pub urgent_this_week: UrgentWeekSummary,
}

impl AchievementCounters {
    /// Whether `achievement` should be unlocked for these counters.
    ///
    /// Special achievements other than [`EFFICIENCY_MASTER`] never qualify.
    ///
    /// # Examples
    /// ```
    /// use questlog::domain::{Achievement, AchievementCounters, AchievementType, UrgentWeekSummary};
    /// use uuid::Uuid;
    ///
    /// let five_tasks = Achievement {
    ///     id: Uuid::nil(),
    ///     name: "Five".into(),
    ///     description: "Complete five tasks".into(),
    ///     achievement_type: AchievementType::TaskMilestone,
    ///     requirement_value: Some(5),
    /// };
    /// let counters = AchievementCounters {
    ///     completed_tasks: 5,
    ///     level: 1,
    ///     urgent_this_week: UrgentWeekSummary::default(),
    /// };
    /// assert!(counters.qualifies(&five_tasks));
    /// ```
    #[must_use]
    pub fn qualifies(&self, achievement: &Achievement) -> bool {
        match achievement.achievement_type {
            AchievementType::TaskMilestone => {
                self.completed_tasks >= requirement(achievement)
            }
            AchievementType::LevelMilestone => u64::from(self.level) >= requirement(achievement),
            AchievementType::Special => {
                achievement.name == EFFICIENCY_MASTER && self.urgent_this_week.all_completed()
            }
        }
    }

    /// Display progress `(current, required)` for a locked achievement.
    ///
    /// Special achievements report no numeric progress.
    #[must_use]
    pub fn progress_for(&self, achievement: &Achievement) -> Option<(u64, u64)> {
        match achievement.achievement_type {
            AchievementType::TaskMilestone => {
                Some((self.completed_tasks, requirement(achievement)))
            }
            AchievementType::LevelMilestone => {
                Some((u64::from(self.level), requirement(achievement)))
            }
            AchievementType::Special => None,
        }
    }
}

fn requirement(achievement: &Achievement) -> u64 {
    achievement
        .requirement_value
        .and_then(|value| u64::try_from(value).ok())
        .unwrap_or(0)
}

/// Catalogue entry annotated with the caller's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    /// Catalogue entry.
    #[serde(flatten)]
    pub achievement: Achievement,
    /// Whether the caller holds it.
    pub is_unlocked: bool,
    /// When it was unlocked.
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Current counter for locked milestones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,
    /// Target counter for locked milestones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<u64>,
}

impl AchievementProgress {
    /// Combine a catalogue entry with the caller's unlock and counters.
    #[must_use]
    pub fn evaluate(
        achievement: Achievement,
        unlocked_at: Option<DateTime<Utc>>,
        counters: &AchievementCounters,
    ) -> Self {
        let (progress, required) = if unlocked_at.is_some() {
            (None, None)
        } else {
            counters
                .progress_for(&achievement)
                .map_or((None, None), |(current, target)| {
                    (Some(current), Some(target))
                })
        };
        Self {
            achievement,
            is_unlocked: unlocked_at.is_some(),
            unlocked_at,
            progress,
            required,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;

    fn entry(name: &str, kind: AchievementType, requirement: Option<i32>) -> Achievement {
        Achievement {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: format!("{name} description"),
            achievement_type: kind,
            requirement_value: requirement,
        }
    }

    #[fixture]
    fn counters() -> AchievementCounters {
        AchievementCounters {
            completed_tasks: 5,
            level: 3,
            urgent_this_week: UrgentWeekSummary::default(),
        }
    }

    #[rstest]
    #[case(5, true)]
    #[case(6, false)]
    #[case(1, true)]
    fn task_milestones_compare_completed_count(
        counters: AchievementCounters,
        #[case] requirement: i32,
        #[case] expected: bool,
    ) {
        let achievement = entry("Tasks", AchievementType::TaskMilestone, Some(requirement));
        assert_eq!(counters.qualifies(&achievement), expected);
    }

    #[rstest]
    #[case(3, true)]
    #[case(5, false)]
    fn level_milestones_compare_level(
        counters: AchievementCounters,
        #[case] requirement: i32,
        #[case] expected: bool,
    ) {
        let achievement = entry("Levels", AchievementType::LevelMilestone, Some(requirement));
        assert_eq!(counters.qualifies(&achievement), expected);
    }

    #[rstest]
    #[case(UrgentWeekSummary { total: 0, completed: 0 }, false)]
    #[case(UrgentWeekSummary { total: 3, completed: 2 }, false)]
    #[case(UrgentWeekSummary { total: 3, completed: 3 }, true)]
    fn efficiency_master_needs_all_urgent_tasks_done(
        mut counters: AchievementCounters,
        #[case] urgent: UrgentWeekSummary,
        #[case] expected: bool,
    ) {
        counters.urgent_this_week = urgent;
        let achievement = entry(EFFICIENCY_MASTER, AchievementType::Special, None);
        assert_eq!(counters.qualifies(&achievement), expected);
    }

    #[rstest]
    fn unknown_specials_never_qualify(mut counters: AchievementCounters) {
        counters.urgent_this_week = UrgentWeekSummary {
            total: 1,
            completed: 1,
        };
        let achievement = entry("Night Owl", AchievementType::Special, None);
        assert!(!counters.qualifies(&achievement));
    }

    #[rstest]
    fn locked_milestones_report_progress(counters: AchievementCounters) {
        let achievement = entry("Ten", AchievementType::TaskMilestone, Some(10));
        let progress = AchievementProgress::evaluate(achievement, None, &counters);
        assert!(!progress.is_unlocked);
        assert_eq!(progress.progress, Some(5));
        assert_eq!(progress.required, Some(10));
    }

    #[rstest]
    fn unlocked_and_special_entries_omit_progress(counters: AchievementCounters) {
        let unlocked_at = Utc
            .with_ymd_and_hms(2026, 3, 4, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let unlocked = AchievementProgress::evaluate(
            entry("One", AchievementType::TaskMilestone, Some(1)),
            Some(unlocked_at),
            &counters,
        );
        assert!(unlocked.is_unlocked);
        assert_eq!(unlocked.progress, None);

        let special = AchievementProgress::evaluate(
            entry(EFFICIENCY_MASTER, AchievementType::Special, None),
            None,
            &counters,
        );
        assert_eq!((special.progress, special.required), (None, None));
    }

    #[rstest]
    fn progress_serialises_camel_case(counters: AchievementCounters) {
        let progress = AchievementProgress::evaluate(
            entry("Rising Star", AchievementType::LevelMilestone, Some(5)),
            None,
            &counters,
        );
        let json = serde_json::to_value(&progress).expect("serialise");
        assert_eq!(json["achievementType"], "level_milestone");
        assert_eq!(json["isUnlocked"], false);
        assert_eq!(json["required"], 5);
    }
}
