//! Grid selection for presentation: county narrowing and selection modes

mod filter;
mod labels;

pub use filter::{
    parse_grid_ids, sort_driest_first, SelectionFilter, SelectionMode, SelectionOutcome,
    SelectionRequest, TopN,
};
pub use labels::{grid_label, matches_county, GridLabels, LABEL_SEPARATOR};
