//! Time-based caching around data providers
//!
//! Normals change rarely and observations update through the day, so each
//! source is wrapped with its own TTL. The projection itself never caches.

use super::{GridNormalsProvider, ObservationProvider};
use crate::error::Result;
use crate::grid::{GridNormal, Observation};
use crate::interval::Interval;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default freshness for grid normals
pub const NORMALS_TTL: Duration = Duration::from_secs(3600);

/// Default freshness for observations
pub const OBSERVATIONS_TTL: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct Entry<K, T> {
    key: K,
    fetched_at: Instant,
    rows: Vec<T>,
}

/// Provider decorator that reuses the last fetch until it is older than `ttl`
#[derive(Debug)]
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    normals: Mutex<Option<Entry<(), GridNormal>>>,
    observations: Mutex<Option<Entry<Interval, Observation>>>,
}

impl<P> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            normals: Mutex::new(None),
            observations: Mutex::new(None),
        }
    }

    fn is_fresh<K, T>(&self, entry: &Entry<K, T>) -> bool {
        entry.fetched_at.elapsed() < self.ttl
    }
}

impl<P: GridNormalsProvider> GridNormalsProvider for CachedProvider<P> {
    fn fetch_grid_normals(&self) -> Result<Vec<GridNormal>> {
        let mut slot = self.normals.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = slot.as_ref().filter(|e| self.is_fresh(e)) {
            log::debug!("Using cached grid normals ({} rows)", entry.rows.len());
            return Ok(entry.rows.clone());
        }

        let rows = self.inner.fetch_grid_normals()?;
        *slot = Some(Entry {
            key: (),
            fetched_at: Instant::now(),
            rows: rows.clone(),
        });
        Ok(rows)
    }
}

impl<P: ObservationProvider> ObservationProvider for CachedProvider<P> {
    fn fetch_observations(&self, interval: &Interval) -> Result<Vec<Observation>> {
        let mut slot = self.observations.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = slot.as_ref().filter(|e| e.key == *interval && self.is_fresh(e)) {
            log::debug!("Using cached observations ({} rows)", entry.rows.len());
            return Ok(entry.rows.clone());
        }

        let rows = self.inner.fetch_observations(interval)?;
        *slot = Some(Entry {
            key: *interval,
            fetched_at: Instant::now(),
            rows: rows.clone(),
        });
        Ok(rows)
    }
}
