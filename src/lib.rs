//! PRF Rainfall Tracker - in-interval indemnity signals for Pasture, Rangeland, Forage grids
//!
//! This library provides:
//! - Grid normals and interval observations loading (CSV, raw daily readings)
//! - Linear end-of-interval rainfall index projection per grid
//! - Likely-indemnity signal against a coverage trigger
//! - Grid selection for display (explicit IDs, labels, likely-only, driest Top-N)
//! - Coverage-level sweeps over one loaded dataset

pub mod config;
pub mod error;
pub mod grid;
pub mod interval;
pub mod projection;
pub mod providers;
pub mod report;
pub mod scenario;
pub mod selection;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use grid::{GridNormal, Observation};
pub use interval::Interval;
pub use projection::{ProjectedGrid, ProjectionConfig, ProjectionEngine, Signal, TrackerSummary};
pub use scenario::{ScenarioRunner, TrackerView};
pub use selection::{SelectionFilter, SelectionOutcome, SelectionRequest, TopN};
