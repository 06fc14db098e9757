//! Discovery timeline export

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::ledger::DiscoveryRecord;
use crate::memory::format_address;

/// Trait for timeline output formats
pub trait ExportFormat {
    /// Header line, if the format has one
    fn header(&self) -> Option<String>;

    /// Format a single discovery record
    fn format_record(&self, record: &DiscoveryRecord) -> String;

    /// Format records in ledger order
    fn format_records(&self, records: &[DiscoveryRecord]) -> String {
        let mut output = String::new();
        if let Some(header) = self.header() {
            output.push_str(&header);
            output.push('\n');
        }
        for record in records {
            output.push_str(&self.format_record(record));
            output.push('\n');
        }
        output
    }
}

/// One readable line per discovery
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl ExportFormat for TextFormat {
    fn header(&self) -> Option<String> {
        None
    }

    fn format_record(&self, record: &DiscoveryRecord) -> String {
        format!(
            "frame {:>8}  {}: {} -> {}  {}",
            record.discovered_at,
            format_address(record.address),
            record.previous_value,
            record.first_seen_value,
            record.category
        )
    }
}

/// Tab-separated values
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvFormat;

impl ExportFormat for TsvFormat {
    fn header(&self) -> Option<String> {
        Some(["frame", "address", "previous", "value", "category"].join("\t"))
    }

    fn format_record(&self, record: &DiscoveryRecord) -> String {
        [
            record.discovered_at.to_string(),
            format_address(record.address),
            record.previous_value.to_string(),
            record.first_seen_value.to_string(),
            record.category.to_string(),
        ]
        .join("\t")
    }
}

/// Records as a pretty-printed JSON array
pub fn export_json(records: &[DiscoveryRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write records to `path`, choosing JSON for `.json` files
pub fn write_timeline<F: ExportFormat>(
    path: &Path,
    format: &F,
    records: &[DiscoveryRecord],
) -> Result<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => export_json(records)?,
        _ => format.format_records(records),
    };
    fs::write(path, content)?;
    Ok(())
}
