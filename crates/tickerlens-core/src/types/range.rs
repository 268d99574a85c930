//! Calendar date ranges for history requests.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RangeError;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawRange> for DateRange {
    type Error = RangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Longest trailing window accepted by [`trailing`](Self::trailing).
    pub const MAX_TRAILING_DAYS: u32 = 36_525;

    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// From `days` calendar days before `end` through `end`, both inclusive,
    /// so the range holds `days + 1` dates.
    pub fn trailing(end: NaiveDate, days: u32) -> Result<Self, RangeError> {
        let too_long = RangeError::TooLong {
            end,
            days,
            max: Self::MAX_TRAILING_DAYS,
        };
        if days > Self::MAX_TRAILING_DAYS {
            return Err(too_long);
        }
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or(too_long)?;
        Ok(Self { start, end })
    }

    /// [`trailing`](Self::trailing) ending today (UTC).
    pub fn ending_today(days: u32) -> Result<Self, RangeError> {
        Self::trailing(Utc::now().date_naive(), days)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Check whether a day falls inside the range.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days between start and end.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
