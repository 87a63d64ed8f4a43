//! Shared helpers for unit tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to a single instant.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `2026-03-04` (a Wednesday) at the given UTC hour.
pub fn wednesday_at(hour: u32) -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 4, hour, 0, 0).single() {
        Some(instant) => instant,
        None => panic!("invalid fixture hour {hour}"),
    }
}
