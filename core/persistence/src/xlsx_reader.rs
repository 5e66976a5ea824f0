//! FILENAME: core/persistence/src/xlsx_reader.rs
//! Reads the first worksheet of a workbook (xlsx, xlsm, xls, ods) into
//! records.
//!
//! The first non-empty row supplies the field names; every later row with at
//! least one non-empty cell becomes a record.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use pivot_engine::{FieldValue, Record};

use crate::PersistenceError;

/// Field name given to a column whose header cell is empty.
const EMPTY_HEADER: &str = "__EMPTY";

pub fn load_xlsx_records(path: &Path) -> Result<Vec<Record>, PersistenceError> {
    let mut workbook = open_workbook_auto(path)?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    };

    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range
        .rows()
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)));

    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers = header_names(header_row);

    let records: Vec<Record> = rows
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(col, name)| {
                    let value = row.get(col).map_or(FieldValue::Null, cell_to_value);
                    (name.clone(), value)
                })
                .collect()
        })
        .collect();

    log::debug!(
        "loaded {} records with {} fields from sheet '{}'",
        records.len(),
        headers.len(),
        sheet_name
    );
    Ok(records)
}

/// Header cells as field names; blanks and repeats get a numeric suffix.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(row.len());
    for cell in row {
        let base = match cell_to_value(cell) {
            FieldValue::Null => EMPTY_HEADER.to_string(),
            value => value.to_text().into_owned(),
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

fn cell_to_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::Null,
        Data::String(s) => FieldValue::Text(s.clone()),
        Data::Float(f) => FieldValue::Number(*f),
        Data::Int(i) => FieldValue::Number(*i as f64),
        Data::Bool(b) => FieldValue::Boolean(*b),
        Data::Error(e) => FieldValue::Text(format!("{:?}", e)),
        Data::DateTime(dt) => FieldValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => FieldValue::Text(s.clone()),
        Data::DurationIso(s) => FieldValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_fill_blanks_and_dedupe() {
        let row = vec![
            Data::String("Region".to_string()),
            Data::Empty,
            Data::String("Region".to_string()),
            Data::Float(2024.0),
            Data::Empty,
        ];
        assert_eq!(
            header_names(&row),
            vec!["Region", "__EMPTY", "Region_1", "2024", "__EMPTY_1"]
        );
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(cell_to_value(&Data::Int(3)), FieldValue::Number(3.0));
        assert_eq!(cell_to_value(&Data::Bool(true)), FieldValue::Boolean(true));
        assert_eq!(cell_to_value(&Data::Empty), FieldValue::Null);
    }
}
