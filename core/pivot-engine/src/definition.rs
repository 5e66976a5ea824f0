//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a pivot:
//! row buckets, column buckets, metrics and the global allow-lists.
//! These structures are designed to be:
//! - Serializable (the presentation layer sends them as JSON)
//! - Immutable snapshots of user intent, recomputed from scratch on change

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{InputError, PivotError};
use crate::record::{FieldValue, Record};

/// Metric id of the placeholder used when no metric is configured.
pub const DEFAULT_METRIC_ID: &str = "count_all";

/// Field name shown for the placeholder metric.
pub const DEFAULT_METRIC_FIELD: &str = "Record";

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported statistics for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregatorType {
    Sum,
    Count,
    Avg,
    Min,
    Max,
    Median,
    DistinctCount,
}

impl Default for AggregatorType {
    fn default() -> Self {
        AggregatorType::Sum
    }
}

impl AggregatorType {
    /// The wire spelling (`sum`, `distinctCount`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregatorType::Sum => "sum",
            AggregatorType::Count => "count",
            AggregatorType::Avg => "avg",
            AggregatorType::Min => "min",
            AggregatorType::Max => "max",
            AggregatorType::Median => "median",
            AggregatorType::DistinctCount => "distinctCount",
        }
    }
}

impl fmt::Display for AggregatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric: one (field, statistic) pair computed per cell.
///
/// `id` keeps two uses of the same field apart (e.g. sum and max of `amount`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotValue {
    pub id: String,
    pub field: String,
    pub aggregator: AggregatorType,
}

impl PivotValue {
    pub fn new(id: impl Into<String>, field: impl Into<String>, aggregator: AggregatorType) -> Self {
        PivotValue {
            id: id.into(),
            field: field.into(),
            aggregator,
        }
    }

    /// The placeholder metric used when the configuration has none.
    pub fn record_count() -> Self {
        PivotValue::new(DEFAULT_METRIC_ID, DEFAULT_METRIC_FIELD, AggregatorType::Count)
    }
}

// ============================================================================
// FILTER DEFINITIONS
// ============================================================================

/// Operators for a single-field filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Membership in `values`. Empty `values` passes everything.
    In,
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Inclusive numeric range `[val1, val2]`.
    Between,
}

impl Default for FilterOperator {
    fn default() -> Self {
        FilterOperator::In
    }
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::In => "in",
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Between => "between",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,

    #[serde(default)]
    pub operator: FilterOperator,

    /// Accepted values for `in`.
    #[serde(default)]
    pub values: Vec<String>,

    /// Comparison operand, or the lower bound for `between`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val1: Option<FieldValue>,

    /// Upper bound for `between`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val2: Option<FieldValue>,
}

impl FilterCondition {
    /// `field in values`.
    pub fn is_in<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterCondition {
            field: field.into(),
            operator: FilterOperator::In,
            values: values.into_iter().map(Into::into).collect(),
            val1: None,
            val2: None,
        }
    }

    /// `field <operator> operand` for the single-operand operators.
    pub fn compare(
        field: impl Into<String>,
        operator: FilterOperator,
        operand: impl Into<FieldValue>,
    ) -> Self {
        FilterCondition {
            field: field.into(),
            operator,
            values: Vec::new(),
            val1: Some(operand.into()),
            val2: None,
        }
    }

    /// `low <= field <= high`.
    pub fn between(
        field: impl Into<String>,
        low: impl Into<FieldValue>,
        high: impl Into<FieldValue>,
    ) -> Self {
        FilterCondition {
            field: field.into(),
            operator: FilterOperator::Between,
            values: Vec::new(),
            val1: Some(low.into()),
            val2: Some(high.into()),
        }
    }
}

// ============================================================================
// BUCKETS
// ============================================================================

/// A named row or column category: the AND of its filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomBucket {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
}

impl CustomBucket {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        CustomBucket {
            id: id.into(),
            label: label.into(),
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete pivot configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotConfig {
    /// Row buckets, in display order.
    #[serde(default)]
    pub custom_rows: Vec<CustomBucket>,

    /// Column buckets, in display order.
    #[serde(default)]
    pub custom_cols: Vec<CustomBucket>,

    /// Metrics computed per cell, in display order.
    #[serde(default)]
    pub values: Vec<PivotValue>,

    /// Global allow-lists: field -> permitted values. Empty list = unrestricted.
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
}

impl PivotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, PivotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PivotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Configured metrics, or the single record-count placeholder.
    pub fn effective_metrics(&self) -> Vec<PivotValue> {
        if self.values.is_empty() {
            vec![PivotValue::record_count()]
        } else {
            self.values.clone()
        }
    }

    /// Eager shape check. `compile` never calls this; it is for callers that
    /// prefer rejecting a configuration over degrading gracefully.
    ///
    /// Field references are only checked when `records` is non-empty, and
    /// `count` metrics are exempt since they ignore their field.
    pub fn validate(&self, records: &[Record]) -> Result<(), InputError> {
        let mut metric_ids = FxHashSet::default();
        for metric in &self.values {
            if metric.id.is_empty() {
                return Err(InputError::EmptyMetricId {
                    field: metric.field.clone(),
                });
            }
            if !metric_ids.insert(metric.id.as_str()) {
                return Err(InputError::DuplicateMetricId(metric.id.clone()));
            }
        }

        validate_axis("row", &self.custom_rows)?;
        validate_axis("column", &self.custom_cols)?;

        if records.is_empty() {
            return Ok(());
        }

        let known = |field: &str| records.iter().any(|r| r.contains(field));

        for metric in &self.values {
            if metric.aggregator != AggregatorType::Count && !known(&metric.field) {
                return Err(InputError::UnknownField(metric.field.clone()));
            }
        }
        for bucket in self.custom_rows.iter().chain(&self.custom_cols) {
            for condition in &bucket.filters {
                if !known(&condition.field) {
                    return Err(InputError::UnknownField(condition.field.clone()));
                }
            }
        }
        for field in self.filters.keys() {
            if !known(field) {
                return Err(InputError::UnknownField(field.clone()));
            }
        }

        Ok(())
    }
}

fn validate_axis(axis: &'static str, buckets: &[CustomBucket]) -> Result<(), InputError> {
    let mut ids = FxHashSet::default();
    for bucket in buckets {
        if !ids.insert(bucket.id.as_str()) {
            return Err(InputError::DuplicateBucketId {
                axis,
                id: bucket.id.clone(),
            });
        }
        for condition in &bucket.filters {
            let missing = match condition.operator {
                FilterOperator::In => false,
                FilterOperator::Between => condition.val1.is_none() || condition.val2.is_none(),
                _ => condition.val1.is_none(),
            };
            if missing {
                return Err(InputError::MissingOperand {
                    bucket: bucket.id.clone(),
                    field: condition.field.clone(),
                    operator: condition.operator,
                });
            }
        }
    }
    Ok(())
}

/// Free-function form of [`PivotConfig::validate`].
pub fn validate_config(config: &PivotConfig, records: &[Record]) -> Result<(), PivotError> {
    config.validate(records).map_err(PivotError::from)
}
