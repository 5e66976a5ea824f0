//! FILENAME: core/pivot-engine/src/export.rs
//! Export Flattener - turns a PivotResult into a rectangular grid.
//!
//! The first row is the header; every row leaf becomes one data row whose
//! first cell is the leaf's label path (`"2024 > Q1"`).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::view::{PivotNode, PivotNodeKind, PivotResult};

/// Title of the first header cell.
pub const ROW_LABEL_TITLE: &str = "Row Label";

/// Separator between ancestor labels in the row label path.
pub const PATH_SEPARATOR: &str = " > ";

/// One cell of the exported grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportCell {
    Empty,
    Number(f64),
    Text(String),
}

impl ExportCell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ExportCell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExportCell::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Flattens the result into header + one row per row leaf.
///
/// Columns follow the flat manifest. A value missing from a leaf becomes
/// `ExportCell::Empty`.
pub fn flatten(result: &PivotResult) -> Vec<Vec<ExportCell>> {
    let mut grid = Vec::with_capacity(1 + result.row_nodes.len());

    let mut header = Vec::with_capacity(1 + result.flat_col_headers.len());
    header.push(ExportCell::Text(ROW_LABEL_TITLE.to_string()));
    header.extend(result.flat_col_headers.iter().map(|col| {
        ExportCell::Text(format!(
            "{} ({} {})",
            col.label, col.metric.aggregator, col.metric.field
        ))
    }));
    grid.push(header);

    let mut path: SmallVec<[&str; 4]> = SmallVec::new();
    flatten_rows(result, &result.row_nodes, &mut path, &mut grid);
    grid
}

fn flatten_rows<'a>(
    result: &PivotResult,
    nodes: &'a [PivotNode],
    path: &mut SmallVec<[&'a str; 4]>,
    grid: &mut Vec<Vec<ExportCell>>,
) {
    for node in nodes {
        path.push(&node.label);
        match &node.kind {
            PivotNodeKind::Leaf { values } => {
                let mut row = Vec::with_capacity(1 + result.flat_col_headers.len());
                row.push(ExportCell::Text(path.join(PATH_SEPARATOR)));
                row.extend(result.flat_col_headers.iter().map(|col| {
                    values
                        .get(&col.key)
                        .map_or(ExportCell::Empty, |v| ExportCell::Number(*v))
                }));
                grid.push(row);
            }
            PivotNodeKind::Internal { children } => flatten_rows(result, children, path, grid),
        }
        path.pop();
    }
}
