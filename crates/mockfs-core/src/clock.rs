// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Injectable time source

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Seconds between 1601-01-01 and 1970-01-01
const FILETIME_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Supplies "now" for timestamp updates
#[cfg_attr(test, mockall::automock)]
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic tests
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 1601-01-01T00:00:00Z, reported for times of nodes that do not exist
pub fn sentinel_utc() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH - Duration::seconds(FILETIME_EPOCH_OFFSET_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn sentinel_is_start_of_1601() {
        let s = sentinel_utc();
        assert_eq!((s.year(), s.month(), s.day()), (1601, 1, 1));
        assert_eq!(s, Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));
    }

    #[test]
    fn mock_time_source() {
        let instant = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut mock = MockTimeSource::new();
        mock.expect_now().times(1).return_const(instant);
        assert_eq!(mock.now(), instant);
    }
}
