use std::cell::Cell;

use chrono::{DateTime, Utc};

/// Largest representable distance from the epoch, in milliseconds.
pub const MAX_TIME_MS: i64 = 8_640_000_000_000_000;

/// A mutable point in time with millisecond precision. `None` is an invalid
/// date.
#[derive(Debug)]
pub struct DateValue {
    time: Cell<Option<i64>>,
}

impl DateValue {
    /// A date at `millis` since the epoch; out-of-range instants are invalid.
    pub fn from_millis(millis: i64) -> Self {
        DateValue {
            time: Cell::new(clip(millis)),
        }
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_millis(dt.timestamp_millis())
    }

    pub fn invalid() -> Self {
        DateValue {
            time: Cell::new(None),
        }
    }

    /// Epoch milliseconds, `None` for an invalid date.
    pub fn time(&self) -> Option<i64> {
        self.time.get()
    }

    pub fn set_time(&self, millis: Option<i64>) {
        self.time.set(millis.and_then(clip));
    }

    pub fn is_valid(&self) -> bool {
        self.time.get().is_some()
    }

    /// The instant as a chrono timestamp, when chrono can represent it.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.time.get().and_then(DateTime::from_timestamp_millis)
    }
}

fn clip(millis: i64) -> Option<i64> {
    (millis.unsigned_abs() <= MAX_TIME_MS as u64).then_some(millis)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_roundtrips_through_chrono() {
        let dt = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap();
        let date = DateValue::from_datetime(dt);
        assert_eq!(date.to_datetime(), Some(dt));
        assert_eq!(date.time(), Some(dt.timestamp_millis()));
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        let date = DateValue::from_millis(MAX_TIME_MS + 1);
        assert!(!date.is_valid());
        date.set_time(Some(0));
        assert!(date.is_valid());
    }
}
