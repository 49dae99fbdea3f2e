//! Data source collaborators feeding the projection engine
//!
//! Normals and observations come from independent sources. Both are fetched
//! concurrently and joined only once both have arrived.

mod cache;

pub use cache::{CachedProvider, NORMALS_TTL, OBSERVATIONS_TTL};

use crate::error::Result;
use crate::grid::{
    aggregate_readings, load_grid_normals, load_observations, load_readings, GridLocator,
    GridNormal, Observation,
};
use crate::interval::Interval;
use std::path::PathBuf;

/// Supplies static reference data per grid
pub trait GridNormalsProvider {
    fn fetch_grid_normals(&self) -> Result<Vec<GridNormal>>;
}

/// Supplies accumulated rainfall per grid for an interval
pub trait ObservationProvider {
    fn fetch_observations(&self, interval: &Interval) -> Result<Vec<Observation>>;
}

/// Grid normals read from a CSV export
#[derive(Debug, Clone)]
pub struct CsvGridNormals {
    path: PathBuf,
}

impl CsvGridNormals {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GridNormalsProvider for CsvGridNormals {
    fn fetch_grid_normals(&self) -> Result<Vec<GridNormal>> {
        load_grid_normals(&self.path)
    }
}

/// Observations already aggregated per grid for the interval
#[derive(Debug, Clone)]
pub struct CsvObservations {
    path: PathBuf,
}

impl CsvObservations {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ObservationProvider for CsvObservations {
    fn fetch_observations(&self, interval: &Interval) -> Result<Vec<Observation>> {
        let observations = load_observations(&self.path)?;
        let stale = observations.iter().filter(|o| !interval.contains(o.last_day)).count();
        if stale > 0 {
            log::warn!(
                "{} observations in {} have a last day outside {}..{}",
                stale,
                self.path.display(),
                interval.start,
                interval.end
            );
        }
        Ok(observations)
    }
}

/// Observations aggregated from raw daily gauge readings
#[derive(Debug, Clone)]
pub struct ReadingsObservations {
    path: PathBuf,
    locator: GridLocator,
}

impl ReadingsObservations {
    pub fn new(path: impl Into<PathBuf>, locator: GridLocator) -> Self {
        Self { path: path.into(), locator }
    }
}

impl ObservationProvider for ReadingsObservations {
    fn fetch_observations(&self, interval: &Interval) -> Result<Vec<Observation>> {
        let readings = load_readings(&self.path)?;
        Ok(aggregate_readings(&readings, &self.locator, interval))
    }
}

impl<T: GridNormalsProvider + ?Sized> GridNormalsProvider for Box<T> {
    fn fetch_grid_normals(&self) -> Result<Vec<GridNormal>> {
        (**self).fetch_grid_normals()
    }
}

impl<T: ObservationProvider + ?Sized> ObservationProvider for Box<T> {
    fn fetch_observations(&self, interval: &Interval) -> Result<Vec<Observation>> {
        (**self).fetch_observations(interval)
    }
}

/// Fetch both sources concurrently; both must succeed before the join
pub fn fetch_sources<N, O>(
    normals: &N,
    observations: &O,
    interval: &Interval,
) -> Result<(Vec<GridNormal>, Vec<Observation>)>
where
    N: GridNormalsProvider + Sync + ?Sized,
    O: ObservationProvider + Sync + ?Sized,
{
    let (grids, obs) = rayon::join(
        || normals.fetch_grid_normals(),
        || observations.fetch_observations(interval),
    );
    Ok((grids?, obs?))
}
