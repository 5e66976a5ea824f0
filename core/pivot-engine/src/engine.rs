//! FILENAME: core/pivot-engine/src/engine.rs
//! Pivot Engine - The calculation core that turns records into a result tree.
//!
//! This module takes a PivotConfig (configuration) and a record slice (data)
//! and produces a PivotResult (trees + flat column manifest).
//!
//! Algorithm:
//! 1. Apply the global allow-lists to get the working scope
//! 2. Build row and column axes from the scope, independently
//! 3. Flatten the column axis to its leaves (this is the column order)
//! 4. Emit one manifest entry per (column leaf, metric)
//! 5. Cross-tabulate: each row leaf aggregates over its intersection with
//!    every column leaf, for every metric
//! 6. Convert the column axis to the output tree for header rendering

use rustc_hash::{FxHashMap, FxHashSet};

use crate::aggregate::aggregate;
use crate::axis::{build_axis, flatten_leaves, AxisKind, AxisNode, FlatAxisItem, RecordSet, KEY_SEPARATOR};
use crate::cancel::CancellationToken;
use crate::definition::{PivotConfig, PivotValue};
use crate::error::PivotError;
use crate::filter::AllowList;
use crate::record::Record;
use crate::view::{ColumnHeader, PivotNode, PivotResult};

/// Composite key of one cell value: `"<columnLeafKey>||<metricId>"`.
pub fn cell_key(column_key: &str, metric_id: &str) -> String {
    format!("{}{}{}", column_key, KEY_SEPARATOR, metric_id)
}

// ============================================================================
// PIVOT CALCULATOR
// ============================================================================

/// The main calculation engine. Borrows its inputs for one run and keeps
/// nothing afterwards.
pub struct PivotCalculator<'a> {
    records: &'a [Record],
    config: &'a PivotConfig,

    /// Configured metrics, or the record-count placeholder.
    metrics: Vec<PivotValue>,
}

impl<'a> PivotCalculator<'a> {
    pub fn new(records: &'a [Record], config: &'a PivotConfig) -> Self {
        PivotCalculator {
            records,
            config,
            metrics: config.effective_metrics(),
        }
    }

    /// Executes the full calculation. Only fails when `cancel` is tripped.
    pub fn calculate(&self, cancel: Option<&CancellationToken>) -> Result<PivotResult, PivotError> {
        self.calculate_until(&|| cancel.is_some_and(CancellationToken::is_cancelled))
    }

    /// Runs the calculation, asking `stop` once before each row leaf.
    fn calculate_until(&self, stop: &dyn Fn() -> bool) -> Result<PivotResult, PivotError> {
        // Step 1: Global allow-lists
        let scope = self.apply_filters();

        // Step 2: Build axis trees
        let row_tree = build_axis(self.records, &scope, &self.config.custom_rows, AxisKind::Rows);
        let col_tree = build_axis(self.records, &scope, &self.config.custom_cols, AxisKind::Columns);

        // Step 3: Column leaves in tree order
        let col_leaves = flatten_leaves(&col_tree);

        // Step 4: Flat column manifest
        let flat_col_headers = self.build_column_headers(&col_leaves);

        // Step 5: Row tree with computed cells
        let row_nodes = row_tree
            .iter()
            .map(|node| self.build_row_node(node, &col_leaves, stop))
            .collect::<Result<Vec<_>, _>>()?;

        // Step 6: Column tree for headers
        let col_nodes = col_tree.iter().map(header_node).collect();

        log::debug!(
            "pivot: {} of {} records in scope, {} row leaves x {} column leaves x {} metrics",
            scope.len(),
            self.records.len(),
            row_tree.len(),
            col_leaves.len(),
            self.metrics.len()
        );

        Ok(PivotResult {
            row_nodes,
            col_nodes,
            flat_col_headers,
        })
    }

    /// Indices of the records that pass every non-empty allow-list.
    fn apply_filters(&self) -> RecordSet {
        let allow = AllowList::new(&self.config.filters);
        let all = RecordSet::all(self.records.len());
        if allow.is_unrestricted() {
            return all;
        }
        all.filter(self.records, |record| allow.permits(record))
    }

    fn build_column_headers(&self, col_leaves: &[FlatAxisItem<'_>]) -> Vec<ColumnHeader> {
        let mut headers = Vec::with_capacity(col_leaves.len() * self.metrics.len());
        let mut seen = FxHashSet::default();
        for col in col_leaves {
            for metric in &self.metrics {
                let key = cell_key(&col.key, &metric.id);
                if !seen.insert(key.clone()) {
                    log::warn!("pivot: duplicate column key '{}', later cells overwrite earlier ones", key);
                }
                headers.push(ColumnHeader {
                    key,
                    label: col.label.to_string(),
                    metric: metric.clone(),
                });
            }
        }
        headers
    }

    fn build_row_node(
        &self,
        node: &AxisNode,
        col_leaves: &[FlatAxisItem<'_>],
        stop: &dyn Fn() -> bool,
    ) -> Result<PivotNode, PivotError> {
        if !node.is_leaf() {
            let children = node
                .children
                .iter()
                .map(|child| self.build_row_node(child, col_leaves, stop))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(PivotNode::internal(node.key.clone(), node.label.clone(), children));
        }

        if stop() {
            log::debug!("pivot: cancelled before row '{}'", node.key);
            return Err(PivotError::Cancelled);
        }

        let mut values = FxHashMap::default();
        values.reserve(col_leaves.len() * self.metrics.len());
        for col in col_leaves {
            let cell = node.records.intersect(col.records);
            for metric in &self.metrics {
                let value = aggregate(cell.records(self.records), &metric.field, metric.aggregator);
                values.insert(cell_key(&col.key, &metric.id), value);
            }
        }

        Ok(PivotNode::leaf(node.key.clone(), node.label.clone(), values))
    }
}

/// Column axis node -> result node (labels and shape only).
fn header_node(node: &AxisNode) -> PivotNode {
    if node.is_leaf() {
        PivotNode::leaf(node.key.clone(), node.label.clone(), FxHashMap::default())
    } else {
        PivotNode::internal(
            node.key.clone(),
            node.label.clone(),
            node.children.iter().map(header_node).collect(),
        )
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Computes a pivot. Total: malformed or missing data degrades per the
/// coercion rules instead of failing.
///
/// Cell keys are `"<columnLeafKey>||<metricId>"`, so two column buckets (or
/// two metrics) sharing an id collide: the manifest lists both entries but
/// each leaf keeps only the later value. [`PivotConfig::validate`] rejects
/// such configurations; `compile` logs a warning and carries on.
pub fn compile(records: &[Record], config: &PivotConfig) -> PivotResult {
    // Without a token the run cannot be cancelled, so the fallback is unreachable.
    PivotCalculator::new(records, config)
        .calculate(None)
        .unwrap_or_default()
}

/// Like [`compile`], but checks `token` before each row leaf and returns
/// `PivotError::Cancelled` once it is tripped.
pub fn compile_with_cancel(
    records: &[Record],
    config: &PivotConfig,
    token: &CancellationToken,
) -> Result<PivotResult, PivotError> {
    PivotCalculator::new(records, config).calculate(Some(token))
}
