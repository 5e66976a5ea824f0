//! FILENAME: core/pivot-engine/src/lib.rs
//! Bucket pivot engine.
//!
//! Given a flat collection of heterogeneous records and a declarative
//! configuration (row buckets, column buckets, metrics, allow-lists), this
//! crate produces a hierarchical cross-tabulation plus the flat column
//! manifest that rendering and export consume.
//!
//! Layers:
//! - `record`: Typed input rows and the coercion rules
//! - `definition`: Serializable configuration (what the pivot IS)
//! - `filter` / `axis`: Bucket evaluation and axis trees
//! - `aggregate`: Per-cell statistics
//! - `engine`: Calculation engine (HOW we calculate)
//! - `view`: Result tree (WHAT we display)
//! - `export`: Flat grid for spreadsheet writers

pub mod record;
pub mod definition;
pub mod error;
pub mod filter;
pub mod axis;
pub mod aggregate;
pub mod cancel;
pub mod view;
pub mod engine;
pub mod export;
pub mod inspect;

pub use record::{FieldValue, Record};
pub use definition::*;
pub use error::{InputError, PivotError};
pub use filter::matches;
pub use axis::{build_axis, AxisKind, AxisNode, RecordSet};
pub use aggregate::aggregate;
pub use cancel::CancellationToken;
pub use view::*;
pub use engine::{cell_key, compile, compile_with_cancel, PivotCalculator};
pub use export::{flatten, ExportCell};
pub use inspect::{field_names, suggest_config, unique_values};
