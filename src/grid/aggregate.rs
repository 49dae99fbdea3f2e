//! Roll raw gauge readings up into per-grid interval observations
//!
//! Readings carry only coordinates, so each one is matched to a grid by its
//! latitude/longitude rounded to three decimals against the grid centers.

use super::{DailyReading, GridReference, Observation};
use crate::interval::Interval;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Coordinate precision used for matching readings to grid centers
const COORD_SCALE: f64 = 1000.0;

/// Rainfall totals are reported to four decimals
const RAIN_SCALE: f64 = 10_000.0;

fn coord_key(lat: f64, lon: f64) -> (i64, i64) {
    ((lat * COORD_SCALE).round() as i64, (lon * COORD_SCALE).round() as i64)
}

/// Lookup from rounded coordinates to grid ids
///
/// Grids whose centers round to the same point all receive that point's readings.
#[derive(Debug, Clone, Default)]
pub struct GridLocator {
    by_coord: HashMap<(i64, i64), Vec<u32>>,
}

impl GridLocator {
    /// Build a locator from grid centers
    pub fn new<I: IntoIterator<Item = GridReference>>(references: I) -> Self {
        let mut by_coord: HashMap<(i64, i64), Vec<u32>> = HashMap::new();
        for reference in references {
            let key = coord_key(reference.center_lat, reference.center_lon);
            let grids = by_coord.entry(key).or_default();
            if let Some(previous) = grids.last() {
                log::warn!(
                    "Grids {} and {} share center {:?}; readings there count for both",
                    previous, reference.grid_id, key
                );
            }
            grids.push(reference.grid_id);
        }
        Self { by_coord }
    }

    /// Grids whose center matches the given point
    pub fn locate(&self, lat: f64, lon: f64) -> &[u32] {
        self.by_coord
            .get(&coord_key(lat, lon))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct center points
    pub fn len(&self) -> usize {
        self.by_coord.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_coord.is_empty()
    }
}

#[derive(Default)]
struct Accumulator {
    total: f64,
    dates: BTreeSet<NaiveDate>,
    file_type: Option<String>,
}

/// Aggregate readings inside `interval` into one observation per grid
///
/// Readings outside the interval or away from any grid center are dropped.
/// Output is ordered by grid id.
pub fn aggregate_readings(
    readings: &[DailyReading],
    locator: &GridLocator,
    interval: &Interval,
) -> Vec<Observation> {
    let mut per_grid: BTreeMap<u32, Accumulator> = BTreeMap::new();
    let mut unmatched = 0usize;
    let mut outside = 0usize;

    for reading in readings {
        if !interval.contains(reading.observation_date) {
            outside += 1;
            continue;
        }
        let grid_ids = locator.locate(reading.latitude, reading.longitude);
        if grid_ids.is_empty() {
            unmatched += 1;
            continue;
        }

        for &grid_id in grid_ids {
            let acc = per_grid.entry(grid_id).or_default();
            acc.total += reading.precip_in;
            acc.dates.insert(reading.observation_date);
            if let Some(file_type) = &reading.file_type {
                match &acc.file_type {
                    Some(current) if current <= file_type => {}
                    _ => acc.file_type = Some(file_type.clone()),
                }
            }
        }
    }

    if outside > 0 || unmatched > 0 {
        log::debug!(
            "Dropped {} readings outside {}..{} and {} readings with no matching grid",
            outside, interval.start, interval.end, unmatched
        );
    }

    per_grid
        .into_iter()
        .filter_map(|(grid_id, acc)| {
            let last_day = *acc.dates.last()?;
            Some(Observation {
                grid_id,
                rain_so_far: (acc.total * RAIN_SCALE).round() / RAIN_SCALE,
                days_collected: acc.dates.len() as u32,
                last_day,
                file_type: acc.file_type,
            })
        })
        .collect()
}
