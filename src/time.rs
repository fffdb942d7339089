//! Quarter-granularity time points.
//!
//! Range membership is decided on the `year + quarter / 10` ordinal; ordering
//! of output series always uses the `(year, quarter)` pair itself.
use crate::error::{DashboardError, Result};
use serde::Serialize;
use std::fmt;

/// Comparable ordinal of a reporting period. Only meaningful for
/// `quarter` in 1..=4, which the normalizer guarantees.
pub fn ordinal(year: i32, quarter: u8) -> f64 {
    year as f64 + quarter as f64 / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimePoint {
    pub year: i32,
    pub quarter: u8,
}

impl TimePoint {
    pub fn new(year: i32, quarter: i64) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(DashboardError::InvalidTimePoint { year, quarter });
        }
        Ok(TimePoint { year, quarter: quarter as u8 })
    }

    pub fn ordinal(&self) -> f64 {
        ordinal(self.year, self.quarter)
    }

    /// Human label such as `2025-Q1`.
    pub fn label(&self) -> String {
        format!("{}-Q{}", self.year, self.quarter)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

/// Inclusive range of time points. `start` after `end` is allowed and
/// simply contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: TimePoint,
    pub end: TimePoint,
}

impl TimeRange {
    pub fn new(start: TimePoint, end: TimePoint) -> Self {
        TimeRange { start, end }
    }

    pub fn contains(&self, year: i32, quarter: u8) -> bool {
        let p = ordinal(year, quarter);
        self.start.ordinal() <= p && p <= self.end.ordinal()
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}
