//! PRF index intervals
//!
//! The program rates rainfall over overlapping two-month intervals, coded
//! 625 (Jan-Feb) through 635 (Nov-Dec). Projection extrapolates to the
//! interval end, so the inclusive day count is the one number with real weight.

use crate::error::{Result, TrackerError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First PRF interval code (Jan-Feb)
pub const FIRST_INTERVAL_CODE: u16 = 625;

/// Last PRF interval code (Nov-Dec)
pub const LAST_INTERVAL_CODE: u16 = 635;

/// Inclusive date range for one index interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// First day of the interval
    pub start: NaiveDate,
    /// Last day of the interval (inclusive)
    pub end: NaiveDate,
}

impl Interval {
    /// Create an interval from explicit dates
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(TrackerError::InvalidConfig(format!(
                "interval end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Resolve a PRF interval code for a crop year
    ///
    /// 625 => Jan 1 - Feb 28/29, 626 => Feb 1 - Mar 31, ... 635 => Nov 1 - Dec 31
    pub fn from_code(year: i32, code: u16) -> Result<Self> {
        if !(FIRST_INTERVAL_CODE..=LAST_INTERVAL_CODE).contains(&code) {
            return Err(TrackerError::InvalidConfig(format!(
                "unknown interval code {} (expected {}-{})",
                code, FIRST_INTERVAL_CODE, LAST_INTERVAL_CODE
            )));
        }

        let start_month = u32::from(code - FIRST_INTERVAL_CODE) + 1;
        let start = NaiveDate::from_ymd_opt(year, start_month, 1)
            .ok_or_else(|| TrackerError::InvalidConfig(format!("invalid year {}", year)))?;
        let end = last_day_of_month(year, start_month + 1)
            .ok_or_else(|| TrackerError::InvalidConfig(format!("invalid year {}", year)))?;

        Self::new(start, end)
    }

    /// Number of calendar days in the interval, both ends included
    pub fn total_days(&self) -> u32 {
        (self.end.signed_duration_since(self.start).num_days() + 1) as u32
    }

    /// Whether a date falls inside the interval
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Percentage of the interval covered by `days` collected, rounded to a whole percent
    pub fn percent_through(&self, days: u32) -> u32 {
        (days as f64 / self.total_days() as f64 * 100.0).round() as u32
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}
