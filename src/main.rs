//! PRF Rainfall Tracker CLI
//!
//! Projects every grid in the configured interval, selects grids for display
//! and prints a signal line per grid. Supports JSON output via --json.
//! Settings come from --config, then PRF_* environment variables, then flags.

use anyhow::{Context, Result};
use clap::Parser;
use prf_tracker::projection::COVERAGE_LEVELS;
use prf_tracker::selection::GridLabels;
use prf_tracker::report::{grid_heading, signal_line, summary_lines, write_detail_csv};
use prf_tracker::{SelectionOutcome, SelectionRequest, TopN, TrackerConfig};
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "prf_tracker", version, about = "Live PRF rainfall index tracker", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid normals CSV
    #[arg(long)]
    normals: Option<PathBuf>,

    /// Aggregated observations CSV
    #[arg(long)]
    observations: Option<PathBuf>,

    /// Raw daily readings CSV, aggregated onto grid centers
    #[arg(long)]
    readings: Option<PathBuf>,

    #[arg(long)]
    year: Option<i32>,

    /// PRF interval code (625 = Jan-Feb ... 635 = Nov-Dec)
    #[arg(long)]
    interval_code: Option<u16>,

    /// Coverage level in percent of normal
    #[arg(long)]
    coverage: Option<u32>,

    /// Comma-separated grid ids, e.g. "7929, 8230"
    #[arg(long)]
    grids: Option<String>,

    /// Grid label as listed by --list-labels (repeatable)
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Narrow candidates to grids touching this county (repeatable)
    #[arg(long = "county")]
    counties: Vec<String>,

    /// Only grids signalling likely indemnity
    #[arg(long)]
    likely_only: bool,

    /// Show the N driest grids, or "All"
    #[arg(long, default_value = "10")]
    top_n: TopN,

    /// Print grid labels (after any --county narrowing) and exit
    #[arg(long)]
    list_labels: bool,

    /// Print the distinct county names and exit
    #[arg(long)]
    list_counties: bool,

    /// Print likely-indemnity counts at every coverage level
    #[arg(long)]
    sweep: bool,

    /// Write the detail table to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Emit the selection as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn tracker_config(&self) -> Result<TrackerConfig> {
        let mut config = match &self.config {
            Some(path) => TrackerConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TrackerConfig::default(),
        }
        .with_env_overrides();

        if let Some(path) = &self.normals {
            config.normals_path = path.clone();
        }
        if let Some(path) = &self.observations {
            config.observations_path = Some(path.clone());
        }
        if let Some(path) = &self.readings {
            config.readings_path = Some(path.clone());
        }
        if let Some(year) = self.year {
            config.year = year;
        }
        if let Some(code) = self.interval_code {
            config.interval_code = code;
        }
        if let Some(level) = self.coverage {
            config.coverage_level = level;
        }
        Ok(config)
    }

    fn selection_request(&self) -> SelectionRequest {
        SelectionRequest {
            grid_entry: self.grids.clone(),
            labels: self.labels.clone(),
            likely_only: self.likely_only,
            top_n: self.top_n,
            counties: self.counties.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let config = cli.tracker_config()?;
    config.projection_config().context("Invalid tracker settings")?;
    let interval = config.interval()?;

    let sources = config.sources().context("Failed to set up data sources")?;
    let runner = sources
        .fetch(interval)
        .context("Failed to fetch grid normals and observations")?;
    log::info!(
        "Loaded {} grids and {} observations in {:.2?}",
        runner.grids().len(),
        runner.observations().len(),
        start.elapsed()
    );

    if cli.list_labels || cli.list_counties {
        let labels = GridLabels::from_grids(runner.grids());
        if cli.list_counties {
            labels.counties().iter().for_each(|county| println!("{}", county));
        } else {
            labels.filtered(&cli.counties).iter().for_each(|label| println!("{}", label));
        }
        return Ok(());
    }

    if cli.sweep {
        let outcomes = runner.sweep(&COVERAGE_LEVELS)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        } else {
            println!("{:>8} {:>6} {:>17}", "Coverage", "Grids", "Likely Indemnity");
            println!("{}", "-".repeat(33));
            for outcome in &outcomes {
                println!(
                    "{:>7}% {:>6} {:>17}",
                    outcome.coverage_level, outcome.grid_count, outcome.likely_indemnity_count
                );
            }
        }
        return Ok(());
    }

    let view = runner
        .view(config.coverage_level, &cli.selection_request())
        .context("Failed to select grids")?;

    if let Some(path) = &cli.output {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_detail_csv(file, view.outcome.grids())?;
        log::info!("Wrote detail table to {}", path.display());
    }

    if cli.json {
        let body = serde_json::json!({
            "interval_start": interval.start,
            "interval_end": interval.end,
            "summary": view.summary,
            "grids": view.outcome.grids(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("PRF Rainfall Tracker");
    println!("====================");
    println!("Interval: {} to {}\n", interval.start, interval.end);

    match (&view.outcome, &view.summary) {
        (SelectionOutcome::Grids(rows), Some(summary)) => {
            for line in summary_lines(summary) {
                println!("{}", line);
            }
            println!();
            for row in rows {
                println!("{}", grid_heading(row));
                println!("  {}", signal_line(row, view.coverage_level));
            }
        }
        _ => println!("No grids found."),
    }

    log::debug!("Finished in {:.2?}", start.elapsed());
    Ok(())
}
