//! Choose which projected grids to present

use super::labels::{matches_county, GridLabels};
use crate::error::{Result, TrackerError};
use crate::projection::{ProjectedGrid, Signal};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How many of the driest grids to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopN {
    Count(usize),
    All,
}

impl Default for TopN {
    fn default() -> Self {
        TopN::Count(10)
    }
}

impl FromStr for TopN {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(TopN::All);
        }
        s.parse::<usize>()
            .map(TopN::Count)
            .map_err(|_| TrackerError::InvalidConfig(format!("driest-N must be a count or \"All\", got {:?}", s)))
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopN::Count(n) => write!(f, "{}", n),
            TopN::All => write!(f, "All"),
        }
    }
}

/// Parse a comma-separated grid-ID list; blank entries are skipped
///
/// Any token that is not an integer fails the whole list. Integers outside
/// the grid-id range (negative or too large) are accepted but dropped, since
/// they can never match a grid.
pub fn parse_grid_ids(input: &str) -> Result<Vec<u32>> {
    let mut ids = Vec::new();
    for token in input.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        if !is_integer_token(token) {
            return Err(TrackerError::Parse {
                input: input.to_string(),
                token: token.to_string(),
            });
        }
        match token.parse::<u32>() {
            Ok(id) => ids.push(id),
            Err(_) => log::debug!("Grid id {} is out of range and matches no grid", token),
        }
    }
    Ok(ids)
}

/// Optional sign followed by one or more ASCII digits
fn is_integer_token(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A single selection mode, resolved from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Grids typed in by id
    ExplicitIds(Vec<u32>),
    /// Grids picked by display label
    Labels(Vec<String>),
    /// Every grid signalling likely indemnity
    LikelyOnly,
    /// The N lowest projected indexes
    Driest(TopN),
}

/// Caller inputs for a selection; the first mode that applies wins
#[derive(Debug, Clone, Default)]
pub struct SelectionRequest {
    /// Free-text comma-separated grid ids
    pub grid_entry: Option<String>,
    /// Labels picked from the grid list
    pub labels: Vec<String>,
    pub likely_only: bool,
    pub top_n: TopN,
    /// Counties narrowing the candidate pool before any mode applies
    pub counties: Vec<String>,
}

impl SelectionRequest {
    /// Resolve the active mode: ids, then labels, then likely-only, then driest-N
    pub fn mode(&self) -> Result<SelectionMode> {
        if let Some(entry) = self.grid_entry.as_deref().filter(|e| !e.trim().is_empty()) {
            return parse_grid_ids(entry).map(SelectionMode::ExplicitIds);
        }
        if !self.labels.is_empty() {
            return Ok(SelectionMode::Labels(self.labels.clone()));
        }
        if self.likely_only {
            return Ok(SelectionMode::LikelyOnly);
        }
        Ok(SelectionMode::Driest(self.top_n))
    }
}

/// Result of a selection; an empty selection is a normal outcome
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Grids(Vec<ProjectedGrid>),
    Empty,
}

impl SelectionOutcome {
    fn from_rows(rows: Vec<ProjectedGrid>) -> Self {
        if rows.is_empty() {
            SelectionOutcome::Empty
        } else {
            SelectionOutcome::Grids(rows)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SelectionOutcome::Empty)
    }

    pub fn grids(&self) -> &[ProjectedGrid] {
        match self {
            SelectionOutcome::Grids(rows) => rows,
            SelectionOutcome::Empty => &[],
        }
    }

    pub fn into_grids(self) -> Vec<ProjectedGrid> {
        match self {
            SelectionOutcome::Grids(rows) => rows,
            SelectionOutcome::Empty => Vec::new(),
        }
    }
}

/// Order rows driest first; ties keep their input order
pub fn sort_driest_first(rows: &mut [ProjectedGrid]) {
    rows.sort_by(|a, b| a.projected_index.total_cmp(&b.projected_index));
}

/// Applies county narrowing and one selection mode to projected grids
#[derive(Debug, Clone, Default)]
pub struct SelectionFilter {
    labels: GridLabels,
}

impl SelectionFilter {
    /// Create a filter resolving named selections through `labels`
    pub fn new(labels: GridLabels) -> Self {
        Self { labels }
    }

    /// Select grids for a request; rows come back driest first
    pub fn apply(&self, grids: &[ProjectedGrid], request: &SelectionRequest) -> Result<SelectionOutcome> {
        let mode = request.mode()?;

        let candidates: Vec<&ProjectedGrid> = if request.counties.is_empty() {
            grids.iter().collect()
        } else {
            grids
                .iter()
                .filter(|g| matches_county(g.county_name.as_deref(), &request.counties))
                .collect()
        };

        self.select(candidates, &mode)
    }

    fn select(&self, candidates: Vec<&ProjectedGrid>, mode: &SelectionMode) -> Result<SelectionOutcome> {
        let mut rows: Vec<ProjectedGrid> = match mode {
            SelectionMode::ExplicitIds(ids) => {
                let wanted: HashSet<u32> = ids.iter().copied().collect();
                candidates.into_iter().filter(|g| wanted.contains(&g.grid_id)).cloned().collect()
            }
            SelectionMode::Labels(labels) => {
                let wanted = labels
                    .iter()
                    .map(|label| self.labels.resolve(label))
                    .collect::<Result<HashSet<u32>>>()?;
                candidates.into_iter().filter(|g| wanted.contains(&g.grid_id)).cloned().collect()
            }
            SelectionMode::LikelyOnly => candidates
                .into_iter()
                .filter(|g| g.signal == Signal::LikelyIndemnity)
                .cloned()
                .collect(),
            SelectionMode::Driest(top_n) => {
                let mut rows: Vec<ProjectedGrid> = candidates.into_iter().cloned().collect();
                sort_driest_first(&mut rows);
                if let TopN::Count(n) = top_n {
                    rows.truncate(*n);
                }
                rows
            }
        };

        sort_driest_first(&mut rows);
        log::debug!("Selection {:?} kept {} grids", mode, rows.len());
        Ok(SelectionOutcome::from_rows(rows))
    }
}
