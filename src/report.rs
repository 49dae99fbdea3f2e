//! Detail table and console lines for a tracker selection

use crate::error::Result;
use crate::projection::{ProjectedGrid, Signal, TrackerSummary};
use csv::Writer;
use serde::Serialize;
use std::io::Write;

/// Detail table row, one per displayed grid
#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    #[serde(rename = "Grid")]
    pub grid: u32,
    #[serde(rename = "Counties")]
    pub counties: String,
    #[serde(rename = "Normal (in)")]
    pub normal_in: f64,
    #[serde(rename = "Days")]
    pub days: u32,
    #[serde(rename = "Rain (in)")]
    pub rain_in: f64,
    #[serde(rename = "Current Idx")]
    pub current_index: f64,
    #[serde(rename = "Proj Rain (in)")]
    pub projected_rain_in: f64,
    #[serde(rename = "Proj Index")]
    pub projected_index: f64,
    #[serde(rename = "Signal")]
    pub signal: String,
    #[serde(rename = "CV%")]
    pub cv_pct: f64,
}

impl From<&ProjectedGrid> for DetailRow {
    fn from(row: &ProjectedGrid) -> Self {
        DetailRow {
            grid: row.grid_id,
            counties: row.county_name.clone().unwrap_or_default(),
            normal_in: row.normal_in,
            days: row.days_collected,
            rain_in: row.rain_so_far,
            current_index: row.partial_index,
            projected_rain_in: row.projected_rain,
            projected_index: row.projected_index,
            signal: row.signal.to_string(),
            cv_pct: row.cv_pct,
        }
    }
}

/// Write the detail table as CSV
pub fn write_detail_csv<W: Write>(writer: W, rows: &[ProjectedGrid]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(DetailRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// One-line verdict for a grid
pub fn signal_line(row: &ProjectedGrid, coverage_level: u32) -> String {
    match row.signal {
        Signal::LikelyIndemnity => format!(
            "LIKELY INDEMNITY — Current: {:.1}  ·  Projected: {:.1}  ·  Trigger: {}",
            row.partial_index, row.projected_index, coverage_level
        ),
        Signal::Ok => format!(
            "OK — Current: {:.1}  ·  Projected: {:.1}",
            row.partial_index, row.projected_index
        ),
    }
}

/// Header line for a grid: id, counties and rainfall progress
pub fn grid_heading(row: &ProjectedGrid) -> String {
    let county = row
        .county_name
        .as_deref()
        .map(|c| format!("  ·  {}", c))
        .unwrap_or_default();
    format!(
        "Grid {}{}  ·  {:.2} of {:.2} in normal  ·  {} days",
        row.grid_id, county, row.rain_so_far, row.normal_in, row.days_collected
    )
}

/// Headline metrics block
pub fn summary_lines(summary: &TrackerSummary) -> Vec<String> {
    vec![
        format!("Grids:            {}", summary.grid_count),
        format!(
            "Days:             {} / {} ({}% through)",
            summary.days_collected, summary.total_days, summary.percent_through
        ),
        format!("Coverage:         {}%", summary.coverage_level),
        format!("Likely Indemnity: {}", summary.likely_indemnity_count),
    ]
}
