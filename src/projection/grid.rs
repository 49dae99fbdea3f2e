//! Output structures for grid projections

use crate::interval::Interval;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Indemnity decision for one grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    /// Projected index falls below the coverage trigger
    LikelyIndemnity,
    Ok,
}

impl Signal {
    pub fn is_likely_indemnity(&self) -> bool {
        matches!(self, Signal::LikelyIndemnity)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::LikelyIndemnity => write!(f, "LIKELY INDEMNITY"),
            Signal::Ok => write!(f, "OK"),
        }
    }
}

/// One grid's projection for the current interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedGrid {
    pub grid_id: u32,
    pub county_name: Option<String>,

    // Reference values
    pub normal_in: f64,
    pub cv_pct: f64,

    // Observed to date
    pub rain_so_far: f64,
    pub days_collected: u32,
    pub last_day: NaiveDate,

    // Derived
    /// Rain to date as a percent of normal (1 decimal)
    pub partial_index: f64,
    /// Average rain per collected day
    pub daily_rate: f64,
    /// Daily rate extrapolated over the whole interval (4 decimals)
    pub projected_rain: f64,
    /// Projected rain as a percent of normal (1 decimal)
    pub projected_index: f64,
    pub signal: Signal,
}

/// Headline numbers shown above a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSummary {
    pub grid_count: usize,
    /// Days collected for the first (driest) grid shown
    pub days_collected: u32,
    pub total_days: u32,
    pub percent_through: u32,
    pub coverage_level: u32,
    pub likely_indemnity_count: usize,
}

impl TrackerSummary {
    /// Summarize a displayed selection
    ///
    /// Returns None for an empty selection.
    pub fn from_rows(rows: &[ProjectedGrid], interval: &Interval, coverage_level: u32) -> Option<Self> {
        let first = rows.first()?;
        Some(Self {
            grid_count: rows.len(),
            days_collected: first.days_collected,
            total_days: interval.total_days(),
            percent_through: interval.percent_through(first.days_collected),
            coverage_level,
            likely_indemnity_count: rows.iter().filter(|r| r.signal.is_likely_indemnity()).count(),
        })
    }
}
