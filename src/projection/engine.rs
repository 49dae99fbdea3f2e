//! Core projection engine: join normals with observations and project each grid
//! linearly to the end of the interval

use crate::error::{Result, TrackerError};
use crate::grid::{GridNormal, Observation};
use crate::interval::Interval;
use super::grid::{ProjectedGrid, Signal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Days in the reference interval (625: Jan 1 - Feb 28, 2026)
pub const DEFAULT_TOTAL_INTERVAL_DAYS: u32 = 59;

/// Coverage levels offered by the program, highest first
pub const COVERAGE_LEVELS: [u32; 5] = [90, 85, 80, 75, 70];

/// Default coverage trigger (percent of normal)
pub const DEFAULT_COVERAGE_LEVEL: u32 = 90;

/// Round half-to-even at `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Length of the interval the daily rate is extrapolated over
    pub total_interval_days: u32,

    /// Percent-of-normal threshold; a projected index strictly below it signals indemnity
    pub coverage_trigger: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            total_interval_days: DEFAULT_TOTAL_INTERVAL_DAYS,
            coverage_trigger: DEFAULT_COVERAGE_LEVEL,
        }
    }
}

impl ProjectionConfig {
    /// Config sized to an interval's day count
    pub fn for_interval(interval: &Interval, coverage_trigger: u32) -> Self {
        Self {
            total_interval_days: interval.total_days(),
            coverage_trigger,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.coverage_trigger == 0 || self.coverage_trigger > 100 {
            return Err(TrackerError::InvalidConfig(format!(
                "coverage trigger {} must be in 1..=100",
                self.coverage_trigger
            )));
        }
        if self.total_interval_days == 0 {
            return Err(TrackerError::InvalidConfig(
                "total interval days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Project every grid that has both a normal and an observation
    ///
    /// Grids without an observation this interval are left out rather than
    /// treated as dry. Output follows the order of `grids`.
    pub fn compute(&self, grids: &[GridNormal], observations: &[Observation]) -> Result<Vec<ProjectedGrid>> {
        self.config.validate()?;

        let mut seen = HashSet::with_capacity(grids.len());
        for grid in grids {
            if !seen.insert(grid.grid_id) {
                return Err(TrackerError::invalid_input(grid.grid_id, "duplicate grid normal"));
            }
        }

        let mut by_grid: HashMap<u32, &Observation> = HashMap::with_capacity(observations.len());
        for obs in observations {
            if by_grid.insert(obs.grid_id, obs).is_some() {
                return Err(TrackerError::invalid_input(obs.grid_id, "duplicate observation"));
            }
        }

        // Collected in input order first so the reported failure is always the earliest row
        let results: Vec<Result<ProjectedGrid>> = grids
            .par_iter()
            .filter_map(|grid| by_grid.get(&grid.grid_id).map(|obs| self.project_grid(grid, obs)))
            .collect();
        let projected = results.into_iter().collect::<Result<Vec<_>>>()?;

        let without_rain = grids.len() - projected.len();
        let without_normal = by_grid.keys().filter(|id| !seen.contains(id)).count();
        if without_rain > 0 || without_normal > 0 {
            log::debug!(
                "Excluded {} grids with no observations and {} observations with no normal",
                without_rain, without_normal
            );
        }
        log::info!(
            "Projected {} grids over {} days at {}% coverage",
            projected.len(),
            self.config.total_interval_days,
            self.config.coverage_trigger
        );

        Ok(projected)
    }

    /// Project a single grid from its normal and observation
    pub fn project_grid(&self, grid: &GridNormal, obs: &Observation) -> Result<ProjectedGrid> {
        if !(grid.normal_in.is_finite() && grid.normal_in > 0.0) {
            return Err(TrackerError::invalid_input(
                grid.grid_id,
                format!("normal_in must be positive, got {}", grid.normal_in),
            ));
        }
        if obs.days_collected == 0 {
            return Err(TrackerError::invalid_input(grid.grid_id, "days_collected must be at least 1"));
        }
        if !(obs.rain_so_far.is_finite() && obs.rain_so_far >= 0.0) {
            return Err(TrackerError::invalid_input(
                grid.grid_id,
                format!("rain_so_far must be non-negative, got {}", obs.rain_so_far),
            ));
        }

        let partial_index = round_to(obs.rain_so_far / grid.normal_in * 100.0, 1);
        let daily_rate = obs.rain_so_far / obs.days_collected as f64;
        let projected_rain = round_to(daily_rate * self.config.total_interval_days as f64, 4);
        let projected_index = round_to(projected_rain / grid.normal_in * 100.0, 1);

        Ok(ProjectedGrid {
            grid_id: grid.grid_id,
            county_name: grid.county_name.clone(),
            normal_in: grid.normal_in,
            cv_pct: grid.cv_pct,
            rain_so_far: obs.rain_so_far,
            days_collected: obs.days_collected,
            last_day: obs.last_day,
            partial_index,
            daily_rate,
            projected_rain,
            projected_index,
            signal: self.signal_for(projected_index),
        })
    }

    /// Signal for a projected index under this engine's coverage trigger
    pub fn signal_for(&self, projected_index: f64) -> Signal {
        if projected_index < self.config.coverage_trigger as f64 {
            Signal::LikelyIndemnity
        } else {
            Signal::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn last_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
    }

    fn engine(coverage_trigger: u32) -> ProjectionEngine {
        ProjectionEngine::new(ProjectionConfig {
            total_interval_days: 59,
            coverage_trigger,
        })
    }

    #[test]
    fn test_wet_grid_projects_ok() {
        let grids = vec![GridNormal::new(7929, 3.2, 0.4)];
        let observations = vec![Observation::new(7929, 1.6, 20, last_day())];

        let rows = engine(90).compute(&grids, &observations).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.partial_index, 50.0);
        assert_relative_eq!(row.daily_rate, 0.08, epsilon = 1e-12);
        assert_relative_eq!(row.projected_rain, 4.72, epsilon = 1e-12);
        assert_eq!(row.projected_index, 147.5);
        assert_eq!(row.signal, Signal::Ok);
    }

    #[test]
    fn test_dry_grid_signals_indemnity() {
        let grids = vec![GridNormal::new(8230, 4.0, 0.4)];
        let observations = vec![Observation::new(8230, 0.5, 20, last_day())];

        let rows = engine(90).compute(&grids, &observations).unwrap();
        let row = &rows[0];
        assert_relative_eq!(row.projected_rain, 1.475, epsilon = 1e-12);
        assert_eq!(row.projected_index, 36.9);
        assert_eq!(row.signal, Signal::LikelyIndemnity);
    }

    #[test]
    fn test_projected_index_matches_formula() {
        let cases = [(0.0, 1, 2.5), (0.37, 3, 1.1), (2.9, 41, 3.7), (5.123, 59, 4.4), (0.01, 7, 0.9)];
        let engine = engine(80);

        for (rain, days, normal) in cases {
            let row = engine
                .project_grid(&GridNormal::new(1, normal, 0.0), &Observation::new(1, rain, days, last_day()))
                .unwrap();
            let expected = round_to(round_to(rain / days as f64 * 59.0, 4) / normal * 100.0, 1);
            assert_eq!(row.projected_index, expected);
        }
    }

    #[test]
    fn test_trigger_boundary_is_strict() {
        // 2.7 in / 59 days projects to exactly 2.7 in; 2.7 / 3.0 => 90.0
        let grid = GridNormal::new(1, 3.0, 0.0);
        let obs = Observation::new(1, 2.7, 59, last_day());

        let at_trigger = engine(90).project_grid(&grid, &obs).unwrap();
        assert_eq!(at_trigger.projected_index, 90.0);
        assert_eq!(at_trigger.signal, Signal::Ok);

        let above_trigger = engine(91).project_grid(&grid, &obs).unwrap();
        assert_eq!(above_trigger.signal, Signal::LikelyIndemnity);
    }

    #[test]
    fn test_raising_trigger_never_clears_indemnity() {
        let grid = GridNormal::new(1, 3.0, 0.0);
        let obs = Observation::new(1, 0.9, 25, last_day());

        let mut was_likely = false;
        for trigger in 1..=100 {
            let signal = engine(trigger).project_grid(&grid, &obs).unwrap().signal;
            if was_likely {
                assert_eq!(signal, Signal::LikelyIndemnity, "trigger {} flipped back to OK", trigger);
            }
            was_likely = signal.is_likely_indemnity();
        }
        assert!(was_likely);
    }

    #[test]
    fn test_grids_without_observations_are_excluded() {
        let grids = vec![
            GridNormal::new(1, 3.0, 0.0),
            GridNormal::new(2, 3.0, 0.0),
            GridNormal::new(3, 3.0, 0.0),
        ];
        let observations = vec![
            Observation::new(3, 1.0, 10, last_day()),
            Observation::new(1, 2.0, 10, last_day()),
            // No normal for this grid
            Observation::new(99, 2.0, 10, last_day()),
        ];

        let rows = engine(90).compute(&grids, &observations).unwrap();
        let ids: Vec<u32> = rows.iter().map(|r| r.grid_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(engine(90).compute(&[], &[]).unwrap().is_empty());
        assert!(engine(90)
            .compute(&[GridNormal::new(1, 3.0, 0.0)], &[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_rows_name_the_grid() {
        let bad_normal = engine(90).compute(
            &[GridNormal::new(42, 0.0, 0.0)],
            &[Observation::new(42, 1.0, 10, last_day())],
        );
        match bad_normal {
            Err(TrackerError::InvalidInput { grid_id, .. }) => assert_eq!(grid_id, 42),
            other => panic!("expected InvalidInput, got {:?}", other),
        }

        let zero_days = engine(90).compute(
            &[GridNormal::new(43, 3.0, 0.0)],
            &[Observation::new(43, 1.0, 0, last_day())],
        );
        assert!(matches!(zero_days, Err(TrackerError::InvalidInput { grid_id: 43, .. })));

        let negative_rain = engine(90).compute(
            &[GridNormal::new(44, 3.0, 0.0)],
            &[Observation::new(44, -0.1, 3, last_day())],
        );
        assert!(matches!(negative_rain, Err(TrackerError::InvalidInput { grid_id: 44, .. })));

        let duplicate = engine(90).compute(
            &[GridNormal::new(45, 3.0, 0.0), GridNormal::new(45, 3.0, 0.0)],
            &[],
        );
        assert!(matches!(duplicate, Err(TrackerError::InvalidInput { grid_id: 45, .. })));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let cases = [
            (f64::NAN, 1.0),
            (f64::INFINITY, 1.0),
            (3.0, f64::NAN),
            (3.0, f64::INFINITY),
        ];
        for (normal, rain) in cases {
            let result = engine(90).compute(
                &[GridNormal::new(46, normal, 0.0)],
                &[Observation::new(46, rain, 10, last_day())],
            );
            assert!(
                matches!(result, Err(TrackerError::InvalidInput { grid_id: 46, .. })),
                "normal {} rain {} was accepted",
                normal,
                rain
            );
        }
    }

    #[test]
    fn test_first_invalid_row_is_reported() {
        let mut grids: Vec<GridNormal> = (1..=200).map(|id| GridNormal::new(id, 3.0, 0.0)).collect();
        grids[10].normal_in = 0.0;
        grids[150].normal_in = -1.0;
        grids[199].normal_in = f64::NAN;
        let observations: Vec<Observation> = (1..=200)
            .map(|id| Observation::new(id, 1.0, 10, last_day()))
            .collect();

        for _ in 0..20 {
            let result = engine(90).compute(&grids, &observations);
            assert!(matches!(result, Err(TrackerError::InvalidInput { grid_id: 11, .. })));
        }
    }

    #[test]
    fn test_invalid_grid_without_observation_is_not_checked() {
        let rows = engine(90)
            .compute(&[GridNormal::new(42, 0.0, 0.0)], &[])
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(engine(0).compute(&[], &[]).is_err());
        assert!(engine(101).compute(&[], &[]).is_err());
        assert!(engine(100).compute(&[], &[]).is_ok());

        let zero_days = ProjectionEngine::new(ProjectionConfig {
            total_interval_days: 0,
            coverage_trigger: 90,
        });
        assert!(matches!(zero_days.compute(&[], &[]), Err(TrackerError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_for_interval() {
        let interval = Interval::from_code(2024, 625).unwrap();
        let config = ProjectionConfig::for_interval(&interval, 85);
        assert_eq!(config.total_interval_days, 60);
        assert_eq!(config.coverage_trigger, 85);
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_to(0.25, 1), 0.2);
        assert_eq!(round_to(0.75, 1), 0.8);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(36.875, 1), 36.9);
    }
}
