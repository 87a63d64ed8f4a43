//! Level table and XP-to-level arithmetic.
//!
//! The table is the single source for every level computation: awarding XP,
//! reporting stats, and rendering progress all call into this module so the
//! displayed progress can never disagree with the stored level.

use serde::{Deserialize, Serialize};

/// Cumulative XP required to reach each level; index `n` is level `n + 1`.
pub const LEVEL_THRESHOLDS: [i64; 30] = [
    0, 100, 250, 500, 1_000, 2_000, 3_500, 5_500, 8_000, 11_000, 14_500, 18_500, 23_000, 28_000,
    33_500, 39_500, 46_000, 53_000, 60_500, 68_500, 77_000, 86_000, 95_500, 105_500, 116_000,
    127_000, 138_500, 150_500, 163_000, 176_000,
];

/// Highest level in the table.
pub const MAX_LEVEL: u32 = 30;

/// Level a freshly registered user starts at.
pub const STARTING_LEVEL: u32 = 1;

/// Return the level reached with `total_xp`.
///
/// Totals below zero are treated as zero.
///
/// # Examples
/// ```
/// use questlog::domain::level_for;
///
/// assert_eq!(level_for(0), 1);
/// assert_eq!(level_for(99), 1);
/// assert_eq!(level_for(100), 2);
/// assert_eq!(level_for(1_000_000), 30);
/// ```
#[must_use]
pub fn level_for(total_xp: i64) -> u32 {
    let reached = LEVEL_THRESHOLDS
        .iter()
        .take_while(|threshold| **threshold <= total_xp)
        .count();
    u32::try_from(reached).map_or(STARTING_LEVEL, |level| level.max(STARTING_LEVEL))
}

/// Cumulative XP needed to start `level`, or `None` outside the table.
#[must_use]
pub fn threshold_for(level: u32) -> Option<i64> {
    let index = usize::try_from(level.checked_sub(1)?).ok()?;
    LEVEL_THRESHOLDS.get(index).copied()
}

/// Position of a total inside its level band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    /// Level reached with the total.
    pub level: u32,
    /// XP earned since the current level started.
    pub xp_into_level: i64,
    /// Width of the current level band; `None` at the maximum level.
    pub xp_for_level: Option<i64>,
    /// XP still required for the next level; `None` at the maximum level.
    pub xp_to_next_level: Option<i64>,
}

impl LevelProgress {
    /// Whether no further level-ups are possible.
    #[must_use]
    pub fn is_max_level(&self) -> bool {
        self.xp_for_level.is_none()
    }
}

/// Compute the level band position for `total_xp`.
///
/// At [`MAX_LEVEL`] the next threshold is unreachable, so only the XP earned
/// since the final threshold is reported.
///
/// # Examples
/// ```
/// use questlog::domain::progress_within_level;
///
/// let progress = progress_within_level(175);
/// assert_eq!(progress.level, 2);
/// assert_eq!(progress.xp_into_level, 75);
/// assert_eq!(progress.xp_for_level, Some(150));
/// assert_eq!(progress.xp_to_next_level, Some(75));
/// ```
#[must_use]
pub fn progress_within_level(total_xp: i64) -> LevelProgress {
    let total_xp = total_xp.max(0);
    let level = level_for(total_xp);
    let start = threshold_for(level).unwrap_or(0);
    let next = level.checked_add(1).and_then(threshold_for);
    LevelProgress {
        level,
        xp_into_level: total_xp - start,
        xp_for_level: next.map(|next| next - start),
        xp_to_next_level: next.map(|next| next - total_xp),
    }
}
