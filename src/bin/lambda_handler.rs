//! AWS Lambda handler for the rainfall tracker
//!
//! Accepts coverage and selection settings as JSON and returns the selected
//! grids with their projections and signals. Data locations come from the
//! PRF_* environment variables; the cached sources are built once per
//! container and shared by every invocation.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use prf_tracker::projection::DEFAULT_COVERAGE_LEVEL;
use prf_tracker::config::TrackerSources;
use prf_tracker::{ProjectedGrid, SelectionRequest, TopN, TrackerConfig, TrackerSummary};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input settings for one tracker view
#[derive(Debug, Deserialize)]
pub struct TrackerRequest {
    /// Coverage level in percent of normal (default: 90)
    #[serde(default = "default_coverage_level")]
    pub coverage_level: u32,

    /// Override the configured crop year
    #[serde(default)]
    pub year: Option<i32>,

    /// Override the configured interval code
    #[serde(default)]
    pub interval_code: Option<u16>,

    /// Comma-separated grid ids
    #[serde(default)]
    pub grids: Option<String>,

    /// Grid labels, e.g. "7929 — Brown / Coleman"
    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub counties: Vec<String>,

    #[serde(default)]
    pub likely_only: bool,

    /// Driest-N count or "All" (default: 10)
    #[serde(default)]
    pub top_n: Option<String>,
}

fn default_coverage_level() -> u32 { DEFAULT_COVERAGE_LEVEL }

/// Output from the tracker
#[derive(Debug, Serialize)]
pub struct TrackerResponse {
    pub coverage_level: u32,
    pub interval_start: String,
    pub interval_end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TrackerSummary>,
    pub grids: Vec<ProjectedGrid>,
    pub execution_time_ms: u64,
}

async fn handler(
    event: LambdaEvent<TrackerRequest>,
    base: &TrackerConfig,
    sources: &TrackerSources,
) -> Result<TrackerResponse, Error> {
    let start = Instant::now();
    let request = event.payload;

    let mut config = base.clone();
    config.coverage_level = request.coverage_level;
    if let Some(year) = request.year {
        config.year = year;
    }
    if let Some(code) = request.interval_code {
        config.interval_code = code;
    }
    config.projection_config()?;

    let top_n = match request.top_n.as_deref() {
        Some(raw) => raw.parse::<TopN>()?,
        None => TopN::default(),
    };
    let selection = SelectionRequest {
        grid_entry: request.grids,
        labels: request.labels,
        likely_only: request.likely_only,
        top_n,
        counties: request.counties,
    };

    let interval = config.interval()?;
    let runner = sources.fetch(interval)?;
    let view = runner.view(config.coverage_level, &selection)?;

    log::info!(
        "Selected {} of {} grids at {}% coverage",
        view.outcome.grids().len(),
        runner.grids().len(),
        view.coverage_level
    );

    Ok(TrackerResponse {
        coverage_level: view.coverage_level,
        interval_start: interval.start.to_string(),
        interval_end: interval.end.to_string(),
        summary: view.summary,
        grids: view.outcome.into_grids(),
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let config = TrackerConfig::default().with_env_overrides();
    let sources = config.sources()?;

    let (config, sources) = (&config, &sources);
    run(service_fn(move |event| handler(event, config, sources))).await
}
