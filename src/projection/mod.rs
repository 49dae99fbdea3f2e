//! Projection engine for per-grid rainfall index projections

mod engine;
mod grid;

pub use engine::{
    round_to, ProjectionConfig, ProjectionEngine, COVERAGE_LEVELS, DEFAULT_COVERAGE_LEVEL,
    DEFAULT_TOTAL_INTERVAL_DAYS,
};
pub use grid::{ProjectedGrid, Signal, TrackerSummary};
