//! Load grid normals, observations and daily readings from CSV

use super::{DailyReading, GridNormal, Observation};
use crate::error::Result;
use chrono::NaiveDate;
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Raw CSV row matching the grid normals export
#[derive(Debug, Deserialize)]
struct NormalCsvRow {
    #[serde(rename = "GRID_ID")]
    grid_id: u32,
    #[serde(rename = "NORMAL_IN")]
    normal_in: f64,
    #[serde(rename = "CV_PCT")]
    cv_pct: f64,
    #[serde(rename = "CONFIDENCE_TIER", default)]
    confidence_tier: Option<String>,
    #[serde(rename = "YEARS_USED", default)]
    years_used: Option<u32>,
    #[serde(rename = "COUNTY_NAME", default)]
    county_name: Option<String>,
    #[serde(rename = "CENTER_LAT", default)]
    center_lat: Option<f64>,
    #[serde(rename = "CENTER_LON", default)]
    center_lon: Option<f64>,
}

impl NormalCsvRow {
    fn to_grid_normal(self) -> GridNormal {
        GridNormal {
            grid_id: self.grid_id,
            normal_in: self.normal_in,
            cv_pct: self.cv_pct,
            confidence_tier: self.confidence_tier.unwrap_or_default(),
            years_used: self.years_used.unwrap_or(0),
            county_name: self
                .county_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            center_lat: self.center_lat,
            center_lon: self.center_lon,
        }
    }
}

/// Raw CSV row for per-grid accumulated rainfall
#[derive(Debug, Serialize, Deserialize)]
struct ObservationCsvRow {
    #[serde(rename = "GRID_ID")]
    grid_id: u32,
    #[serde(rename = "RAIN_SO_FAR")]
    rain_so_far: f64,
    #[serde(rename = "DAYS_COLLECTED")]
    days_collected: u32,
    #[serde(rename = "LAST_DAY")]
    last_day: NaiveDate,
    #[serde(rename = "FILE_TYPE", default)]
    file_type: Option<String>,
}

impl From<ObservationCsvRow> for Observation {
    fn from(row: ObservationCsvRow) -> Self {
        Observation {
            grid_id: row.grid_id,
            rain_so_far: row.rain_so_far,
            days_collected: row.days_collected,
            last_day: row.last_day,
            file_type: row.file_type.filter(|t| !t.is_empty()),
        }
    }
}

impl From<&Observation> for ObservationCsvRow {
    fn from(obs: &Observation) -> Self {
        ObservationCsvRow {
            grid_id: obs.grid_id,
            rain_so_far: obs.rain_so_far,
            days_collected: obs.days_collected,
            last_day: obs.last_day,
            file_type: obs.file_type.clone(),
        }
    }
}

/// Raw CSV row for one gauge reading
#[derive(Debug, Deserialize)]
struct ReadingCsvRow {
    #[serde(rename = "OBSERVATION_DATE")]
    observation_date: NaiveDate,
    #[serde(rename = "LATITUDE")]
    latitude: f64,
    #[serde(rename = "LONGITUDE")]
    longitude: f64,
    #[serde(rename = "PRECIP_IN")]
    precip_in: f64,
    #[serde(rename = "FILE_TYPE", default)]
    file_type: Option<String>,
}

impl From<ReadingCsvRow> for DailyReading {
    fn from(row: ReadingCsvRow) -> Self {
        DailyReading {
            observation_date: row.observation_date,
            latitude: row.latitude,
            longitude: row.longitude,
            precip_in: row.precip_in,
            file_type: row.file_type.filter(|t| !t.is_empty()),
        }
    }
}

/// Load all grid normals from a CSV file
pub fn load_grid_normals<P: AsRef<Path>>(path: P) -> Result<Vec<GridNormal>> {
    let file = std::fs::File::open(path)?;
    load_grid_normals_from_reader(file)
}

/// Load grid normals from any reader (e.g., string buffer, network stream)
pub fn load_grid_normals_from_reader<R: Read>(reader: R) -> Result<Vec<GridNormal>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut grids = Vec::new();

    for result in csv_reader.deserialize() {
        let row: NormalCsvRow = result?;
        grids.push(row.to_grid_normal());
    }

    log::debug!("Loaded {} grid normals", grids.len());
    Ok(grids)
}

/// Load accumulated observations from a CSV file
pub fn load_observations<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
    let file = std::fs::File::open(path)?;
    load_observations_from_reader(file)
}

/// Load accumulated observations from any reader
pub fn load_observations_from_reader<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut observations = Vec::new();

    for result in csv_reader.deserialize() {
        let row: ObservationCsvRow = result?;
        observations.push(row.into());
    }

    log::debug!("Loaded {} grid observations", observations.len());
    Ok(observations)
}

/// Load raw daily readings from a CSV file
pub fn load_readings<P: AsRef<Path>>(path: P) -> Result<Vec<DailyReading>> {
    let file = std::fs::File::open(path)?;
    load_readings_from_reader(file)
}

/// Load raw daily readings from any reader
pub fn load_readings_from_reader<R: Read>(reader: R) -> Result<Vec<DailyReading>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut readings = Vec::new();

    for result in csv_reader.deserialize() {
        let row: ReadingCsvRow = result?;
        readings.push(row.into());
    }

    log::debug!("Loaded {} daily readings", readings.len());
    Ok(readings)
}

/// Write observations in the same layout `load_observations` reads
pub fn write_observations<W: Write>(writer: W, observations: &[Observation]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for obs in observations {
        csv_writer.serialize(ObservationCsvRow::from(obs))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMALS_CSV: &str = "\
GRID_ID,NORMAL_IN,CV_PCT,CONFIDENCE_TIER,YEARS_USED,COUNTY_NAME,CENTER_LAT,CENTER_LON
7929,3.2,0.4,HIGH,3,Brown / Coleman,31.725,-99.125
8230,4.0,0.5,MEDIUM,3,,,
";

    #[test]
    fn test_load_grid_normals() {
        let grids = load_grid_normals_from_reader(NORMALS_CSV.as_bytes()).unwrap();
        assert_eq!(grids.len(), 2);

        let first = &grids[0];
        assert_eq!(first.grid_id, 7929);
        assert_eq!(first.normal_in, 3.2);
        assert_eq!(first.confidence_tier, "HIGH");
        assert_eq!(first.years_used, 3);
        assert_eq!(first.county_name.as_deref(), Some("Brown / Coleman"));
        assert_eq!(first.center_lon, Some(-99.125));

        let second = &grids[1];
        assert_eq!(second.county_name, None);
        assert_eq!(second.center_lat, None);
    }

    #[test]
    fn test_observations_round_trip_through_writer() {
        let csv = "\
GRID_ID,RAIN_SO_FAR,DAYS_COLLECTED,LAST_DAY,FILE_TYPE
7929,1.6,20,2026-01-20,RT
8230,0.5,20,2026-01-20,
";
        let observations = load_observations_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].days_collected, 20);
        assert_eq!(observations[0].last_day, NaiveDate::from_ymd_opt(2026, 1, 20).unwrap());
        assert_eq!(observations[0].file_type.as_deref(), Some("RT"));
        assert_eq!(observations[1].file_type, None);

        let mut buffer = Vec::new();
        write_observations(&mut buffer, &observations).unwrap();
        let reloaded = load_observations_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(reloaded, observations);
    }

    #[test]
    fn test_load_readings() {
        let csv = "\
OBSERVATION_DATE,LATITUDE,LONGITUDE,PRECIP_IN,FILE_TYPE
2026-01-03,31.725,-99.125,0.25,RT
";
        let readings = load_readings_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].precip_in, 0.25);
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let csv = "GRID_ID,NORMAL_IN,CV_PCT\nabc,3.2,0.4\n";
        assert!(load_grid_normals_from_reader(csv.as_bytes()).is_err());
    }
}
