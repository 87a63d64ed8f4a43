//! Calendar windows derived from an injected clock.
//!
//! Days and weeks are evaluated in UTC. Weeks start on Sunday at midnight and
//! every window is half-open: `start <= t < end`.

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// The UTC calendar day containing `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use questlog::domain::TimeWindow;
    ///
    /// let now = Utc.with_ymd_and_hms(2026, 3, 4, 17, 30, 0).single().expect("valid");
    /// let day = TimeWindow::day_containing(now);
    /// assert_eq!(day.start(), Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).single().expect("valid"));
    /// assert_eq!(day.end(), Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).single().expect("valid"));
    /// ```
    #[must_use]
    pub fn day_containing(now: DateTime<Utc>) -> Self {
        let start = midnight(now);
        Self {
            start,
            end: start + Days::new(1),
        }
    }

    /// The Sunday-to-Sunday week containing `now`.
    #[must_use]
    pub fn week_containing(now: DateTime<Utc>) -> Self {
        let since_sunday = u64::from(now.weekday().num_days_from_sunday());
        let start = midnight(now) - Days::new(since_sunday);
        Self {
            start,
            end: start + Days::new(7),
        }
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("valid timestamp")
    }

    // 2026-03-01 is a Sunday.
    #[rstest]
    #[case(at(2026, 3, 1, 0, 0))]
    #[case(at(2026, 3, 4, 12, 0))]
    #[case(at(2026, 3, 7, 23, 59))]
    fn week_runs_sunday_to_sunday(#[case] now: DateTime<Utc>) {
        let week = TimeWindow::week_containing(now);
        assert_eq!(week.start(), at(2026, 3, 1, 0, 0));
        assert_eq!(week.end(), at(2026, 3, 8, 0, 0));
        assert!(week.contains(now));
    }

    #[rstest]
    fn window_end_is_exclusive() {
        let day = TimeWindow::day_containing(at(2026, 3, 4, 9, 0));
        assert!(day.contains(at(2026, 3, 4, 0, 0)));
        assert!(!day.contains(at(2026, 3, 5, 0, 0)));
    }

    #[rstest]
    fn week_crosses_month_and_year_boundaries() {
        // 2026-01-01 is a Thursday.
        let week = TimeWindow::week_containing(at(2026, 1, 1, 8, 0));
        assert_eq!(week.start(), at(2025, 12, 28, 0, 0));
        assert_eq!(week.end(), at(2026, 1, 4, 0, 0));
    }
}
