//! Human-readable reports.
//!
//! - **Change reports**: deltas grouped by range, plus a candidate summary
//! - **Frequency analysis**: which addresses change across several actions
//! - **Timeline export**: discovery records as text, TSV or JSON
//!
//! Every delta line has the form `0xADDR: before -> after (Δ±diff) [label]`.

mod changes;
mod frequency;
mod timeline;

use crate::snapshot::Delta;

pub use changes::{ChangeReport, RangeGroup};
pub use frequency::FrequencyAnalysis;
pub use timeline::{ExportFormat, TextFormat, TsvFormat, export_json, write_timeline};

/// Maximum delta lines printed per range
pub const PER_RANGE_LIMIT: usize = 10;
/// Maximum entries in the candidate summary
pub const CANDIDATE_LIMIT: usize = 15;

/// `0xADDR: before -> after (Δ±diff) [label]`
pub fn format_line(delta: &Delta, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{} [{}]", delta, label),
        None => delta.to_string(),
    }
}
