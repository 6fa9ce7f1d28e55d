//! CSV export functionality.
//!
//! Writes one run's records to a fully quoted UTF-8 CSV file. The header is
//! the scraper's declared column list; one row per record, no index column.

use std::fs::{self, File};
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use crate::error_handling::ExportError;
use crate::record::Record;

/// Exports records to a CSV file.
///
/// # Arguments
///
/// * `records` - Rows to write, in order
/// * `columns` - Header row; also selects and orders each record's cells
/// * `path` - Destination file; missing parent directories are created
///
/// # Returns
///
/// Returns the number of data rows written (the file holds one more line for
/// the header).
///
/// # Errors
///
/// `ExportError::NoRecords` when `records` is empty (no file is written),
/// otherwise I/O or CSV errors from creating and writing the file.
pub fn export_csv(records: &[Record], columns: &[&str], path: &Path) -> Result<usize, ExportError> {
    if records.is_empty() {
        log::error!("NO DATA SCRAPED. EXITING...");
        return Err(ExportError::NoRecords);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(file);

    writer.write_record(columns)?;

    let mut record_count = 0;
    for record in records {
        writer.write_record(record.cells(columns))?;
        record_count += 1;
    }

    writer.flush()?;
    log::info!(
        "Wrote {} records to {}",
        record_count,
        path.display()
    );

    Ok(record_count)
}
