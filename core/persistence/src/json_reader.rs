//! FILENAME: core/persistence/src/json_reader.rs
//! Reads records from a JSON array of flat objects.

use std::fs;
use std::path::Path;

use pivot_engine::Record;

use crate::PersistenceError;

pub fn parse_json_records(json: &str) -> Result<Vec<Record>, PersistenceError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_json_records(path: &Path) -> Result<Vec<Record>, PersistenceError> {
    let content = fs::read_to_string(path)?;
    let records = parse_json_records(&content)?;
    log::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
