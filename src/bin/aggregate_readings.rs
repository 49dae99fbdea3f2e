//! Aggregate raw daily gauge readings into per-grid interval observations
//!
//! Readings are matched to grids by center coordinates from the normals file,
//! summed over the interval and written in the observations CSV layout.

use anyhow::{Context, Result};
use clap::Parser;
use prf_tracker::grid::{aggregate_readings, load_grid_normals, load_readings, write_observations, GridLocator};
use prf_tracker::Interval;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aggregate_readings", version, about = "Aggregate daily readings into grid observations")]
struct Cli {
    /// Raw daily readings CSV
    readings: PathBuf,

    /// Grid normals CSV with CENTER_LAT / CENTER_LON columns
    #[arg(long, default_value = prf_tracker::config::DEFAULT_NORMALS_PATH)]
    normals: PathBuf,

    #[arg(long, default_value_t = 2026)]
    year: i32,

    /// PRF interval code (625 = Jan-Feb ... 635 = Nov-Dec)
    #[arg(long, default_value_t = 625)]
    interval_code: u16,

    /// Output CSV; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let interval = Interval::from_code(cli.year, cli.interval_code)?;
    let grids = load_grid_normals(&cli.normals)
        .with_context(|| format!("Failed to load grid normals {}", cli.normals.display()))?;
    let locator = GridLocator::new(grids.iter().filter_map(|g| g.reference()));
    if locator.is_empty() {
        anyhow::bail!("{} has no grid center coordinates", cli.normals.display());
    }

    let readings = load_readings(&cli.readings)
        .with_context(|| format!("Failed to load readings {}", cli.readings.display()))?;
    let observations = aggregate_readings(&readings, &locator, &interval);
    log::info!(
        "Aggregated {} readings into {} grid observations for {}..{}",
        readings.len(),
        observations.len(),
        interval.start,
        interval.end
    );

    match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            write_observations(file, &observations)?;
        }
        None => write_observations(io::stdout().lock(), &observations)?,
    }
    Ok(())
}
