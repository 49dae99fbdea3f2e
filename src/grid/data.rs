//! Grid reference data and rainfall observation records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Separator used when a grid spans several counties
pub const COUNTY_SEPARATOR: &str = " / ";

/// Static reference data for one insured grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridNormal {
    /// Unique grid identifier
    pub grid_id: u32,

    /// Historical normal rainfall for the interval (inches)
    pub normal_in: f64,

    /// Coefficient of variation of the normal estimate (percent)
    pub cv_pct: f64,

    /// Quality tier of the normal estimate
    pub confidence_tier: String,

    /// Number of years behind the normal
    pub years_used: u32,

    /// County label, several counties joined with " / "
    pub county_name: Option<String>,

    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,
}

impl GridNormal {
    /// Create a grid normal with no county or coordinates
    pub fn new(grid_id: u32, normal_in: f64, cv_pct: f64) -> Self {
        Self {
            grid_id,
            normal_in,
            cv_pct,
            confidence_tier: String::new(),
            years_used: 0,
            county_name: None,
            center_lat: None,
            center_lon: None,
        }
    }

    /// Builder-style county label
    pub fn with_county(mut self, county_name: impl Into<String>) -> Self {
        self.county_name = Some(county_name.into());
        self
    }

    /// Builder-style grid center
    pub fn with_center(mut self, lat: f64, lon: f64) -> Self {
        self.center_lat = Some(lat);
        self.center_lon = Some(lon);
        self
    }

    /// Individual county names, trimmed
    pub fn counties(&self) -> impl Iterator<Item = &str> {
        self.county_name
            .as_deref()
            .into_iter()
            .flat_map(|names| names.split(COUNTY_SEPARATOR))
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Grid center, when both coordinates are known
    pub fn reference(&self) -> Option<GridReference> {
        Some(GridReference {
            grid_id: self.grid_id,
            center_lat: self.center_lat?,
            center_lon: self.center_lon?,
        })
    }
}

/// Accumulated rainfall for one grid over the current interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub grid_id: u32,

    /// Cumulative precipitation observed to date (inches)
    pub rain_so_far: f64,

    /// Distinct days with an observation
    pub days_collected: u32,

    /// Date of the most recent observation
    pub last_day: NaiveDate,

    /// Source file type of the readings (lowest value wins)
    pub file_type: Option<String>,
}

impl Observation {
    pub fn new(grid_id: u32, rain_so_far: f64, days_collected: u32, last_day: NaiveDate) -> Self {
        Self {
            grid_id,
            rain_so_far,
            days_collected,
            last_day,
            file_type: None,
        }
    }
}

/// One raw daily precipitation value at a gauge point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    pub observation_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub precip_in: f64,
    pub file_type: Option<String>,
}

/// Grid center used to map gauge readings onto grids
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridReference {
    pub grid_id: u32,
    pub center_lat: f64,
    pub center_lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counties_split() {
        let grid = GridNormal::new(7929, 3.2, 0.4).with_county("Brown / Coleman /  Mills ");
        let counties: Vec<_> = grid.counties().collect();
        assert_eq!(counties, vec!["Brown", "Coleman", "Mills"]);

        let no_county = GridNormal::new(8230, 4.0, 0.4);
        assert_eq!(no_county.counties().count(), 0);
    }

    #[test]
    fn test_reference_requires_both_coordinates() {
        let grid = GridNormal::new(7929, 3.2, 0.4).with_center(31.5, -99.25);
        let reference = grid.reference().unwrap();
        assert_eq!(reference.grid_id, 7929);
        assert_eq!(reference.center_lat, 31.5);

        let mut partial = GridNormal::new(8230, 4.0, 0.4);
        partial.center_lat = Some(31.5);
        assert!(partial.reference().is_none());
    }
}
