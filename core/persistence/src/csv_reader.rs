//! FILENAME: core/persistence/src/csv_reader.rs
//! Reads records from comma-separated text with a header row.
//!
//! Cells are trimmed. A cell whose text is numeric becomes a number, any
//! other cell stays text (including the empty string). Rows shorter than the
//! header fill the missing trailing fields with Null.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use pivot_engine::{FieldValue, Record};

use crate::PersistenceError;

pub fn parse_csv_records(content: &str) -> Result<Vec<Record>, PersistenceError> {
    read_records(content.as_bytes())
}

pub fn load_csv_records(path: &Path) -> Result<Vec<Record>, PersistenceError> {
    let file = File::open(path)?;
    let records = read_records(BufReader::new(file))?;
    log::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn read_records<R: Read>(source: R) -> Result<Vec<Record>, PersistenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let value = row.get(col).map_or(FieldValue::Null, cell_to_value);
                (name.clone(), value)
            })
            .collect();
        records.push(record);
    }
    Ok(records)
}

fn cell_to_value(cell: &str) -> FieldValue {
    let text = FieldValue::Text(cell.to_string());
    match text.as_number() {
        Some(n) => FieldValue::Number(n),
        None => text,
    }
}
