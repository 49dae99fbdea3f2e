//! Grid normals, rainfall observations and their loading

mod data;
mod aggregate;
pub mod loader;

pub use data::{DailyReading, GridNormal, GridReference, Observation, COUNTY_SEPARATOR};
pub use aggregate::{aggregate_readings, GridLocator};
pub use loader::{
    load_grid_normals, load_grid_normals_from_reader, load_observations,
    load_observations_from_reader, load_readings, load_readings_from_reader, write_observations,
};
