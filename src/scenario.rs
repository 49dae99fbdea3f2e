//! Scenario runner for re-projecting one dataset at several coverage levels
//!
//! Loads normals and observations once, then re-runs the engine with
//! different triggers without touching the sources again.

use crate::error::Result;
use crate::grid::{GridNormal, Observation};
use crate::interval::Interval;
use crate::projection::{ProjectedGrid, ProjectionConfig, ProjectionEngine, TrackerSummary};
use crate::providers::{fetch_sources, GridNormalsProvider, ObservationProvider};
use crate::selection::{GridLabels, SelectionFilter, SelectionOutcome, SelectionRequest};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Likely-indemnity count at one coverage level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageOutcome {
    pub coverage_level: u32,
    pub grid_count: usize,
    pub likely_indemnity_count: usize,
}

/// A selection ready for display at one coverage level
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerView {
    pub coverage_level: u32,
    pub outcome: SelectionOutcome,
    /// None when the selection is empty
    pub summary: Option<TrackerSummary>,
}

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::fetch(&normals, &observations, interval)?;
/// for outcome in runner.sweep(&COVERAGE_LEVELS)? {
///     println!("{}%: {}", outcome.coverage_level, outcome.likely_indemnity_count);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    interval: Interval,
    grids: Vec<GridNormal>,
    observations: Vec<Observation>,
}

impl ScenarioRunner {
    /// Create runner from already-loaded datasets
    pub fn new(interval: Interval, grids: Vec<GridNormal>, observations: Vec<Observation>) -> Self {
        Self {
            interval,
            grids,
            observations,
        }
    }

    /// Create runner by fetching both sources concurrently
    pub fn fetch<N, O>(normals: &N, observations: &O, interval: Interval) -> Result<Self>
    where
        N: GridNormalsProvider + Sync + ?Sized,
        O: ObservationProvider + Sync + ?Sized,
    {
        let (grids, observations) = fetch_sources(normals, observations, &interval)?;
        Ok(Self::new(interval, grids, observations))
    }

    /// Project every grid at one coverage level
    pub fn run(&self, coverage_level: u32) -> Result<Vec<ProjectedGrid>> {
        let config = ProjectionConfig::for_interval(&self.interval, coverage_level);
        ProjectionEngine::new(config).compute(&self.grids, &self.observations)
    }

    /// Project at several coverage levels, one result per level in input order
    pub fn run_levels(&self, levels: &[u32]) -> Result<Vec<Vec<ProjectedGrid>>> {
        levels.par_iter().map(|&level| self.run(level)).collect()
    }

    /// Likely-indemnity counts per coverage level
    pub fn sweep(&self, levels: &[u32]) -> Result<Vec<CoverageOutcome>> {
        let results = self.run_levels(levels)?;
        Ok(levels
            .iter()
            .zip(results)
            .map(|(&coverage_level, rows)| CoverageOutcome {
                coverage_level,
                grid_count: rows.len(),
                likely_indemnity_count: rows.iter().filter(|r| r.signal.is_likely_indemnity()).count(),
            })
            .collect())
    }

    /// Project at one coverage level and select grids for display
    pub fn view(&self, coverage_level: u32, request: &SelectionRequest) -> Result<TrackerView> {
        let rows = self.run(coverage_level)?;
        let filter = SelectionFilter::new(GridLabels::from_grids(&self.grids));
        let outcome = filter.apply(&rows, request)?;
        let summary = TrackerSummary::from_rows(outcome.grids(), &self.interval, coverage_level);
        if outcome.is_empty() {
            log::info!("No grids found for the current selection");
        }
        Ok(TrackerView {
            coverage_level,
            outcome,
            summary,
        })
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    pub fn grids(&self) -> &[GridNormal] {
        &self.grids
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::COVERAGE_LEVELS;
    use chrono::NaiveDate;

    fn runner() -> ScenarioRunner {
        let last_day = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        ScenarioRunner::new(
            Interval::from_code(2026, 625).unwrap(),
            vec![
                GridNormal::new(1, 3.0, 0.4),
                GridNormal::new(2, 3.0, 0.4),
                GridNormal::new(3, 3.0, 0.4),
            ],
            vec![
                // 72.0% of normal
                Observation::new(1, 0.732203, 20, last_day),
                // 88.0%
                Observation::new(2, 0.894915, 20, last_day),
                // 150.0%
                Observation::new(3, 1.525424, 20, last_day),
            ],
        )
    }

    #[test]
    fn test_sweep_counts_rise_with_coverage() {
        let outcomes = runner().sweep(&COVERAGE_LEVELS).unwrap();
        let counts: Vec<(u32, usize)> = outcomes
            .iter()
            .map(|o| (o.coverage_level, o.likely_indemnity_count))
            .collect();
        assert_eq!(counts, vec![(90, 2), (85, 1), (80, 1), (75, 1), (70, 0)]);
        assert!(outcomes.iter().all(|o| o.grid_count == 3));
    }

    #[test]
    fn test_run_levels_preserves_order() {
        let results = runner().run_levels(&[70, 90]).unwrap();
        assert_eq!(results.len(), 2);
        assert!(!results[0][0].signal.is_likely_indemnity());
        assert!(results[1][0].signal.is_likely_indemnity());
    }

    #[test]
    fn test_view_selects_and_summarizes() {
        let request = SelectionRequest {
            likely_only: true,
            ..Default::default()
        };
        let view = runner().view(85, &request).unwrap();
        let ids: Vec<u32> = view.outcome.grids().iter().map(|g| g.grid_id).collect();
        assert_eq!(ids, vec![1]);

        let summary = view.summary.unwrap();
        assert_eq!(summary.grid_count, 1);
        assert_eq!(summary.coverage_level, 85);
        assert_eq!(summary.likely_indemnity_count, 1);

        let empty = runner().view(70, &request).unwrap();
        assert!(empty.outcome.is_empty());
        assert!(empty.summary.is_none());
    }

    #[test]
    fn test_invalid_level_fails_sweep() {
        assert!(runner().sweep(&[90, 0]).is_err());
    }
}
