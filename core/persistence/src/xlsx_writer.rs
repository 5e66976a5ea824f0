//! FILENAME: core/persistence/src/xlsx_writer.rs
//! Writes a flattened pivot grid to a single-sheet workbook.

use std::path::Path;

use pivot_engine::ExportCell;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};

use crate::PersistenceError;

/// Name of the worksheet holding the exported pivot.
pub const EXPORT_SHEET_NAME: &str = "Pivot Data";

pub fn save_grid_xlsx(grid: &[Vec<ExportCell>], path: &Path) -> Result<(), PersistenceError> {
    let mut xlsx = build_workbook(grid)?;
    xlsx.save(path)?;
    log::debug!("exported {} grid rows to {}", grid.len(), path.display());
    Ok(())
}

/// Same as [`save_grid_xlsx`], but returns the file bytes.
pub fn grid_to_xlsx_bytes(grid: &[Vec<ExportCell>]) -> Result<Vec<u8>, PersistenceError> {
    let mut xlsx = build_workbook(grid)?;
    Ok(xlsx.save_to_buffer()?)
}

fn build_workbook(grid: &[Vec<ExportCell>]) -> Result<XlsxWorkbook, PersistenceError> {
    let mut xlsx = XlsxWorkbook::new();
    let worksheet = xlsx.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    let header_format = Format::new().set_bold();

    for (row_idx, row) in grid.iter().enumerate() {
        let row_num = u32::try_from(row_idx).map_err(|_| {
            PersistenceError::InvalidFormat(format!("row {} exceeds the sheet limit", row_idx))
        })?;
        let format = (row_idx == 0).then_some(&header_format);
        write_row(worksheet, row_num, row, format)?;
    }

    Ok(xlsx)
}

fn write_row(
    worksheet: &mut Worksheet,
    row: u32,
    cells: &[ExportCell],
    format: Option<&Format>,
) -> Result<(), PersistenceError> {
    for (col_idx, cell) in cells.iter().enumerate() {
        let col = u16::try_from(col_idx).map_err(|_| {
            PersistenceError::InvalidFormat(format!("column {} exceeds the sheet limit", col_idx))
        })?;
        match (cell, format) {
            (ExportCell::Empty, _) => {}
            (ExportCell::Number(n), Some(fmt)) => {
                worksheet.write_number_with_format(row, col, *n, fmt)?;
            }
            (ExportCell::Number(n), None) => {
                worksheet.write_number(row, col, *n)?;
            }
            (ExportCell::Text(s), Some(fmt)) => {
                worksheet.write_string_with_format(row, col, s, fmt)?;
            }
            (ExportCell::Text(s), None) => {
                worksheet.write_string(row, col, s)?;
            }
        }
    }
    Ok(())
}

/// Download name for an export: `<stem>_pivot.xlsx`, or `pivot_export.xlsx`
/// when there is no source file name.
pub fn export_file_name(source_name: Option<&str>) -> String {
    source_name
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map_or_else(
            || "pivot_export.xlsx".to_string(),
            |stem| format!("{}_pivot.xlsx", stem),
        )
}
