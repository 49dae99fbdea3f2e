//! Tracker configuration
//!
//! Settings come from an optional JSON file, then environment variables:
//!   PRF_NORMALS_PATH, PRF_OBSERVATIONS_PATH, PRF_READINGS_PATH,
//!   PRF_YEAR, PRF_INTERVAL_CODE, PRF_COVERAGE_LEVEL,
//!   PRF_NORMALS_TTL_SECS, PRF_OBSERVATIONS_TTL_SECS
//! Command-line flags in the binaries override both.

use crate::error::Result;
use crate::grid::{load_grid_normals, GridLocator};
use crate::interval::Interval;
use crate::projection::{ProjectionConfig, DEFAULT_COVERAGE_LEVEL};
use crate::providers::{
    CachedProvider, CsvGridNormals, CsvObservations, ObservationProvider, ReadingsObservations,
    NORMALS_TTL, OBSERVATIONS_TTL,
};
use crate::scenario::ScenarioRunner;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default location of the grid normals export
pub const DEFAULT_NORMALS_PATH: &str = "data/grid_normals.csv";

/// Default location of the aggregated observations
pub const DEFAULT_OBSERVATIONS_PATH: &str = "data/observations.csv";

fn default_normals_path() -> PathBuf { PathBuf::from(DEFAULT_NORMALS_PATH) }
fn default_year() -> i32 { 2026 }
fn default_interval_code() -> u16 { 625 }
fn default_coverage_level() -> u32 { DEFAULT_COVERAGE_LEVEL }
fn default_normals_ttl() -> u64 { NORMALS_TTL.as_secs() }
fn default_observations_ttl() -> u64 { OBSERVATIONS_TTL.as_secs() }

/// Where interval observations come from
pub type BoxedObservations = Box<dyn ObservationProvider + Send + Sync>;

/// Cached data sources, built once and shared across requests
///
/// Observations are cached per interval, so requests for different
/// intervals can share one set of sources.
pub struct TrackerSources {
    pub normals: CachedProvider<CsvGridNormals>,
    pub observations: BoxedObservations,
}

impl TrackerSources {
    /// Fetch both sources for an interval, reusing cached rows within their TTL
    pub fn fetch(&self, interval: Interval) -> Result<ScenarioRunner> {
        ScenarioRunner::fetch(&self.normals, &self.observations, interval)
    }
}

/// Settings for one tracker run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Grid normals CSV
    #[serde(default = "default_normals_path")]
    pub normals_path: PathBuf,

    /// Pre-aggregated observations CSV
    #[serde(default)]
    pub observations_path: Option<PathBuf>,

    /// Raw daily readings CSV; takes priority over `observations_path`
    #[serde(default)]
    pub readings_path: Option<PathBuf>,

    /// Crop year of the interval
    #[serde(default = "default_year")]
    pub year: i32,

    /// PRF interval code (625 = Jan-Feb ... 635 = Nov-Dec)
    #[serde(default = "default_interval_code")]
    pub interval_code: u16,

    /// Coverage trigger in percent of normal
    #[serde(default = "default_coverage_level")]
    pub coverage_level: u32,

    #[serde(default = "default_normals_ttl")]
    pub normals_ttl_secs: u64,

    #[serde(default = "default_observations_ttl")]
    pub observations_ttl_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            normals_path: default_normals_path(),
            observations_path: None,
            readings_path: None,
            year: default_year(),
            interval_code: default_interval_code(),
            coverage_level: default_coverage_level(),
            normals_ttl_secs: default_normals_ttl(),
            observations_ttl_secs: default_observations_ttl(),
        }
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

impl TrackerConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Apply environment-variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = env_value::<PathBuf>("PRF_NORMALS_PATH") {
            self.normals_path = path;
        }
        if let Some(path) = env_value::<PathBuf>("PRF_OBSERVATIONS_PATH") {
            self.observations_path = Some(path);
        }
        if let Some(path) = env_value::<PathBuf>("PRF_READINGS_PATH") {
            self.readings_path = Some(path);
        }
        if let Some(year) = env_value("PRF_YEAR") {
            self.year = year;
        }
        if let Some(code) = env_value("PRF_INTERVAL_CODE") {
            self.interval_code = code;
        }
        if let Some(level) = env_value("PRF_COVERAGE_LEVEL") {
            self.coverage_level = level;
        }
        if let Some(secs) = env_value("PRF_NORMALS_TTL_SECS") {
            self.normals_ttl_secs = secs;
        }
        if let Some(secs) = env_value("PRF_OBSERVATIONS_TTL_SECS") {
            self.observations_ttl_secs = secs;
        }
        self
    }

    pub fn interval(&self) -> Result<Interval> {
        Interval::from_code(self.year, self.interval_code)
    }

    /// Engine settings sized to the configured interval
    pub fn projection_config(&self) -> Result<ProjectionConfig> {
        let config = ProjectionConfig::for_interval(&self.interval()?, self.coverage_level);
        config.validate()?;
        Ok(config)
    }

    /// Build the cached sources; keep the result alive to benefit from the cache
    pub fn sources(&self) -> Result<TrackerSources> {
        Ok(TrackerSources {
            normals: self.normals_provider(),
            observations: self.observations_provider()?,
        })
    }

    /// Cached CSV source for grid normals
    fn normals_provider(&self) -> CachedProvider<CsvGridNormals> {
        CachedProvider::new(
            CsvGridNormals::new(&self.normals_path),
            Duration::from_secs(self.normals_ttl_secs),
        )
    }

    /// Cached observation source: raw readings when configured, else the aggregated CSV
    ///
    /// Readings are matched to grids through the centers in the normals file.
    fn observations_provider(&self) -> Result<BoxedObservations> {
        let ttl = Duration::from_secs(self.observations_ttl_secs);
        if let Some(readings) = &self.readings_path {
            let grids = load_grid_normals(&self.normals_path)?;
            let locator = GridLocator::new(grids.iter().filter_map(|g| g.reference()));
            log::info!("Aggregating readings from {} onto {} grid centers", readings.display(), locator.len());
            return Ok(Box::new(CachedProvider::new(ReadingsObservations::new(readings, locator), ttl)));
        }

        let path = self
            .observations_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OBSERVATIONS_PATH));
        Ok(Box::new(CachedProvider::new(CsvObservations::new(path), ttl)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("prf_tracker_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const NORMALS_HEADER: &str = "GRID_ID,NORMAL_IN,CV_PCT,CONFIDENCE_TIER,YEARS_USED,COUNTY_NAME,CENTER_LAT,CENTER_LON\n";
    const OBSERVATIONS_HEADER: &str = "GRID_ID,RAIN_SO_FAR,DAYS_COLLECTED,LAST_DAY,FILE_TYPE\n";

    #[test]
    fn test_sources_reuse_fetch_within_ttl() {
        let dir = scratch_dir("sources_ttl");
        let normals = dir.join("normals.csv");
        let observations = dir.join("observations.csv");
        fs::write(&normals, format!("{}7929,3.2,0.4,HIGH,3,Brown,,\n", NORMALS_HEADER)).unwrap();
        fs::write(&observations, format!("{}7929,1.6,20,2026-01-20,RT\n", OBSERVATIONS_HEADER)).unwrap();

        let config = TrackerConfig {
            normals_path: normals.clone(),
            observations_path: Some(observations.clone()),
            ..Default::default()
        };
        let sources = config.sources().unwrap();
        let interval = config.interval().unwrap();

        let first = sources.fetch(interval).unwrap();
        assert_eq!(first.grids().len(), 1);
        assert_eq!(first.observations().len(), 1);

        // Sources change on disk; a second request inside the TTL still sees the cached rows
        fs::write(
            &normals,
            format!("{}7929,3.2,0.4,HIGH,3,Brown,,\n8230,4.0,0.5,HIGH,3,Coleman,,\n", NORMALS_HEADER),
        )
        .unwrap();
        fs::write(
            &observations,
            format!("{}7929,1.6,20,2026-01-20,RT\n8230,0.5,20,2026-01-20,RT\n", OBSERVATIONS_HEADER),
        )
        .unwrap();
        let second = sources.fetch(interval).unwrap();
        assert_eq!(second.grids().len(), 1);
        assert_eq!(second.observations().len(), 1);

        // Another interval misses the observation cache only
        let feb_mar = Interval::from_code(2026, 626).unwrap();
        let third = sources.fetch(feb_mar).unwrap();
        assert_eq!(third.grids().len(), 1);
        assert_eq!(third.observations().len(), 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let config = TrackerConfig::from_json("{}").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.interval().unwrap().total_days(), 59);

        let projection = config.projection_config().unwrap();
        assert_eq!(projection.total_interval_days, 59);
        assert_eq!(projection.coverage_trigger, 90);
    }

    #[test]
    fn test_json_overrides() {
        let config = TrackerConfig::from_json(
            r#"{"year": 2024, "interval_code": 626, "coverage_level": 75, "readings_path": "rt.csv"}"#,
        )
        .unwrap();
        assert_eq!(config.coverage_level, 75);
        assert_eq!(config.readings_path, Some(PathBuf::from("rt.csv")));
        assert_eq!(config.projection_config().unwrap().total_interval_days, 60);
        assert_eq!(config.normals_ttl_secs, 3600);
    }

    #[test]
    fn test_invalid_settings() {
        let config = TrackerConfig {
            coverage_level: 120,
            ..Default::default()
        };
        assert!(matches!(config.projection_config(), Err(TrackerError::InvalidConfig(_))));

        let config = TrackerConfig {
            interval_code: 700,
            ..Default::default()
        };
        assert!(config.interval().is_err());

        assert!(matches!(TrackerConfig::from_json("{"), Err(TrackerError::Json(_))));
    }
}
