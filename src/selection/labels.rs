//! Display labels and county matching for grid pickers

use crate::error::{Result, TrackerError};
use crate::grid::GridNormal;
use std::collections::{BTreeSet, HashMap};

/// Separator between grid id and county list in a label
pub const LABEL_SEPARATOR: &str = " — ";

/// Label shown for a grid: "<id> — <counties>", or just the id
pub fn grid_label(grid: &GridNormal) -> String {
    match &grid.county_name {
        Some(county) => format!("{}{}{}", grid.grid_id, LABEL_SEPARATOR, county),
        None => grid.grid_id.to_string(),
    }
}

/// Whether a joined county label matches any selected county
///
/// This is a substring test against the whole label, so "Clay" also matches
/// "Clayton". Grids with no county never match.
pub fn matches_county(county_name: Option<&str>, selected: &[String]) -> bool {
    match county_name {
        Some(name) => selected.iter().any(|county| name.contains(county.as_str())),
        None => false,
    }
}

/// Label -> grid id mapping maintained for named selection
#[derive(Debug, Clone, Default)]
pub struct GridLabels {
    by_label: HashMap<String, u32>,
    labels: Vec<(String, Option<String>)>,
    counties: BTreeSet<String>,
}

impl GridLabels {
    /// Build labels for every grid, in grid order
    pub fn from_grids(grids: &[GridNormal]) -> Self {
        let mut by_label = HashMap::with_capacity(grids.len());
        let mut labels = Vec::with_capacity(grids.len());
        let mut counties = BTreeSet::new();
        for grid in grids {
            let label = grid_label(grid);
            by_label.insert(label.clone(), grid.grid_id);
            labels.push((label, grid.county_name.clone()));
            counties.extend(grid.counties().map(str::to_string));
        }
        Self {
            by_label,
            labels,
            counties,
        }
    }

    /// Grid id behind a label
    pub fn resolve(&self, label: &str) -> Result<u32> {
        self.by_label
            .get(label)
            .copied()
            .ok_or_else(|| TrackerError::UnknownLabel(label.to_string()))
    }

    /// Labels narrowed to the selected counties; no counties means no narrowing
    pub fn filtered(&self, counties: &[String]) -> Vec<&str> {
        self.labels
            .iter()
            .filter(|(_, county)| counties.is_empty() || matches_county(county.as_deref(), counties))
            .map(|(label, _)| label.as_str())
            .collect()
    }

    /// Sorted distinct county names across all grids
    pub fn counties(&self) -> Vec<String> {
        self.counties.iter().cloned().collect()
    }
}
