//! FILENAME: core/persistence/src/lib.rs
//! Pivot Persistence Module
//!
//! Thin I/O around the pivot engine: loads records from CSV, JSON or
//! spreadsheet files and writes flattened pivot grids back out as XLSX.

mod csv_reader;
mod error;
mod json_reader;
mod xlsx_reader;
mod xlsx_writer;

pub use csv_reader::{load_csv_records, parse_csv_records};
pub use error::PersistenceError;
pub use json_reader::{load_json_records, parse_json_records};
pub use xlsx_reader::load_xlsx_records;
pub use xlsx_writer::{export_file_name, grid_to_xlsx_bytes, save_grid_xlsx, EXPORT_SHEET_NAME};

use std::path::Path;

use pivot_engine::Record;

/// Loads records, choosing the reader from the file extension.
pub fn load_records(path: &Path) -> Result<Vec<Record>, PersistenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => load_csv_records(path),
        "json" => load_json_records(path),
        "xlsx" | "xlsm" | "xls" => load_xlsx_records(path),
        other => Err(PersistenceError::UnsupportedFormat(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{}", other)
        })),
    }
}
