//! FILENAME: core/pivot-engine/src/view.rs
//! Pivot View - the result tree handed to the presentation layer.
//!
//! Rendering owns layout; this module only carries:
//! - the row tree with computed leaf values
//! - the column tree (labels and shape only)
//! - the flat column manifest, the authoritative column order

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::definition::PivotValue;

// ============================================================================
// RESULT TREE
// ============================================================================

/// Payload of a result node: leaves carry values, internal nodes children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PivotNodeKind {
    /// Values keyed `"<columnLeafKey>||<metricId>"`. Empty for column leaves.
    /// Non-finite values serialize as JSON `null` and read back as NaN.
    Leaf {
        #[serde(deserialize_with = "deserialize_cell_values")]
        values: FxHashMap<String, f64>,
    },
    Internal { children: Vec<PivotNode> },
}

/// One element of the row or column result tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotNode {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: PivotNodeKind,
}

impl PivotNode {
    pub fn leaf(key: impl Into<String>, label: impl Into<String>, values: FxHashMap<String, f64>) -> Self {
        PivotNode {
            key: key.into(),
            label: label.into(),
            kind: PivotNodeKind::Leaf { values },
        }
    }

    pub fn internal(key: impl Into<String>, label: impl Into<String>, children: Vec<PivotNode>) -> Self {
        PivotNode {
            key: key.into(),
            label: label.into(),
            kind: PivotNodeKind::Internal { children },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, PivotNodeKind::Leaf { .. })
    }

    /// Children of an internal node; empty for leaves.
    pub fn children(&self) -> &[PivotNode] {
        match &self.kind {
            PivotNodeKind::Internal { children } => children,
            PivotNodeKind::Leaf { .. } => &[],
        }
    }

    /// Values of a leaf; None for internal nodes.
    pub fn values(&self) -> Option<&FxHashMap<String, f64>> {
        match &self.kind {
            PivotNodeKind::Leaf { values } => Some(values),
            PivotNodeKind::Internal { .. } => None,
        }
    }

    /// A single value of a leaf by composite key.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values().and_then(|v| v.get(key).copied())
    }

    /// Number of leaves under (or at) this node: the row/col span.
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            PivotNodeKind::Leaf { .. } => 1,
            PivotNodeKind::Internal { children } => children.iter().map(PivotNode::leaf_count).sum(),
        }
    }

    /// Levels from this node down to its deepest leaf (a leaf is 1).
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(PivotNode::depth).max().unwrap_or(0)
    }
}

/// One entry of the flat column manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHeader {
    /// `"<columnLeafKey>||<metricId>"`.
    pub key: String,
    /// Label of the column leaf.
    pub label: String,
    pub metric: PivotValue,
}

/// Min/max of one manifest column across all row leaves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

/// The complete output of one pivot run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResult {
    pub row_nodes: Vec<PivotNode>,
    pub col_nodes: Vec<PivotNode>,
    pub flat_col_headers: Vec<ColumnHeader>,
}

impl PivotResult {
    /// Row leaves in depth-first order.
    pub fn row_leaves(&self) -> Vec<&PivotNode> {
        let mut out = Vec::new();
        collect_leaves(&self.row_nodes, &mut out);
        out
    }

    /// Depth of the column header tree; 0 when there are no columns.
    pub fn col_depth(&self) -> usize {
        self.col_nodes.iter().map(PivotNode::depth).max().unwrap_or(0)
    }

    /// Per manifest column, the value range over the row leaves. Columns with
    /// no values report `0..1` so a color scale never divides by zero.
    pub fn column_ranges(&self) -> Vec<(String, ColumnRange)> {
        let leaves = self.row_leaves();
        self.flat_col_headers
            .iter()
            .map(|header| {
                let mut range: Option<ColumnRange> = None;
                for value in leaves.iter().filter_map(|leaf| leaf.value(&header.key)) {
                    range = Some(match range {
                        Some(r) => ColumnRange {
                            min: r.min.min(value),
                            max: r.max.max(value),
                        },
                        None => ColumnRange { min: value, max: value },
                    });
                }
                (header.key.clone(), range.unwrap_or(ColumnRange { min: 0.0, max: 1.0 }))
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn deserialize_cell_values<'de, D>(deserializer: D) -> Result<FxHashMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = FxHashMap::<String, Option<f64>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or(f64::NAN)))
        .collect())
}

fn collect_leaves<'a>(nodes: &'a [PivotNode], out: &mut Vec<&'a PivotNode>) {
    for node in nodes {
        match &node.kind {
            PivotNodeKind::Leaf { .. } => out.push(node),
            PivotNodeKind::Internal { children } => collect_leaves(children, out),
        }
    }
}
