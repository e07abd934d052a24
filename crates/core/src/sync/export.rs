//! CSV export of the change log.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::FixedOffset;
use csv::{Terminator, WriterBuilder};

use super::changelog::ChangeLogEntry;
use super::error::SyncError;

/// CSV header row.
pub const CSV_HEADERS: [&str; 7] = [
    "Timestamp",
    "Section",
    "Action",
    "Description",
    "Amount",
    "Category",
    "Month/Year",
];

/// Rejects timestamp formats chrono cannot render.
///
/// # Errors
///
/// Returns `SyncError::InvalidTimestampFormat` on an unknown specifier.
pub fn check_timestamp_format(format: &str) -> Result<(), SyncError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(SyncError::InvalidTimestampFormat(format.to_string()));
    }
    Ok(())
}

/// Renders `entries` as CSV: a header row, then one row per entry.
///
/// Rows are separated by `\n` with no trailing newline. Timestamps are shown
/// at `offset` using `timestamp_format`; missing optional fields are empty.
/// Fields are quoted only when they contain a comma, quote or newline.
///
/// # Errors
///
/// Returns an error if the timestamp format cannot be rendered or the CSV
/// writer fails.
pub fn export_csv<'a>(
    entries: impl IntoIterator<Item = &'a ChangeLogEntry>,
    offset: FixedOffset,
    timestamp_format: &str,
) -> Result<String, SyncError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for entry in entries {
        let mut timestamp = String::new();
        write!(
            timestamp,
            "{}",
            entry.timestamp.with_timezone(&offset).format(timestamp_format)
        )
        .map_err(|_| SyncError::InvalidTimestampFormat(timestamp_format.to_string()))?;

        let metadata = &entry.metadata;
        writer.write_record([
            timestamp,
            entry.section().to_string(),
            entry.action.to_string(),
            metadata.description.clone().unwrap_or_default(),
            metadata.amount.map(|a| a.to_string()).unwrap_or_default(),
            metadata.category.clone().unwrap_or_default(),
            metadata.month_year.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SyncError::ExportEncoding(e.to_string()))?;
    let mut csv = String::from_utf8(bytes).map_err(|e| SyncError::ExportEncoding(e.to_string()))?;
    if csv.ends_with('\n') {
        csv.pop();
    }
    Ok(csv)
}
