//! FILENAME: core/pivot-engine/src/error.rs

use thiserror::Error;

use crate::definition::FilterOperator;

/// Errors surfaced by the pivot engine.
///
/// `compile` itself never fails; these come from the opt-in entry points
/// (validation, cancellable compilation, JSON configuration).
#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Invalid pivot configuration: {0}")]
    InvalidConfig(#[from] InputError),

    #[error("Pivot calculation cancelled")]
    Cancelled,

    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration shape problems found by `PivotConfig::validate`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("metric on field '{field}' has an empty id")]
    EmptyMetricId { field: String },

    #[error("duplicate metric id '{0}'")]
    DuplicateMetricId(String),

    #[error("duplicate {axis} bucket id '{id}'")]
    DuplicateBucketId { axis: &'static str, id: String },

    #[error("bucket '{bucket}': '{operator}' filter on '{field}' is missing an operand")]
    MissingOperand {
        bucket: String,
        field: String,
        operator: FilterOperator,
    },

    #[error("field '{0}' does not occur in any record")]
    UnknownField(String),
}
