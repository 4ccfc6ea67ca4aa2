//! Height-estimate anchor
//!
//! A known `(height, timestamp)` pair shipped with each network. The node
//! uses it to guess the current chain height from the wall clock before it
//! has synced. It is only ever recalibrated by shipping a new build.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::derived;

/// A blockchain height observed at a known time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightAnchor {
    /// Block height
    pub height: u64,
    /// Timestamp (Unix epoch seconds)
    pub timestamp: i64,
}

impl HeightAnchor {
    /// Create a new anchor
    pub const fn new(height: u64, timestamp: i64) -> Self {
        Self { height, timestamp }
    }

    /// Anchor timestamp as a UTC date
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Estimated height at unix time `now`
    pub const fn estimate_height_at_unix(&self, now: i64, avg_block_time: Duration) -> u64 {
        derived::estimate_height(*self, now, avg_block_time)
    }

    /// Estimated height at `now`
    pub fn estimate_height_at(&self, now: DateTime<Utc>, avg_block_time: Duration) -> u64 {
        self.estimate_height_at_unix(now.timestamp(), avg_block_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_roundtrip() {
        let anchor = HeightAnchor::new(582_088, 1_595_359_932);
        let when = anchor.datetime().unwrap();

        assert_eq!(when, Utc.with_ymd_and_hms(2020, 7, 21, 19, 32, 12).unwrap());
    }

    #[test]
    fn test_estimate_from_datetime() {
        let anchor = HeightAnchor::new(100, 1_595_360_006);
        let one_day_later = anchor.datetime().unwrap() + chrono::Duration::days(1);

        assert_eq!(
            anchor.estimate_height_at(one_day_later, Duration::from_secs(120)),
            100 + 720
        );
    }
}
