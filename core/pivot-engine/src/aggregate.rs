//! FILENAME: core/pivot-engine/src/aggregate.rs
//! Aggregator - computes one scalar metric over a record subset.
//!
//! Numeric statistics read the lenient numeric view of the field and skip
//! anything that does not coerce. An empty population yields 0 for every
//! statistic, never NaN.

use rustc_hash::FxHashSet;

use crate::definition::AggregatorType;
use crate::record::{FieldValue, Record};

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Accumulator for one (field, statistic) pair.
/// Only the state the statistic needs is collected.
#[derive(Debug, Clone, Default)]
pub struct AggregateAccumulator {
    /// Records seen, numeric or not.
    pub count: u64,
    /// Records whose value coerced to a number.
    pub count_numbers: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Numeric population, kept for median only.
    samples: Vec<f64>,
    keep_samples: bool,
    /// Distinct non-null string forms, kept for distinctCount only.
    distinct: FxHashSet<String>,
    keep_distinct: bool,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An accumulator that tracks what `aggregator` needs.
    pub fn for_aggregator(aggregator: AggregatorType) -> Self {
        AggregateAccumulator {
            keep_samples: aggregator == AggregatorType::Median,
            keep_distinct: aggregator == AggregatorType::DistinctCount,
            ..Self::default()
        }
    }

    /// Adds one field value.
    pub fn add(&mut self, value: &FieldValue) {
        if self.keep_distinct && !value.is_null() {
            let text = value.to_text();
            if !self.distinct.contains(text.as_ref()) {
                self.distinct.insert(text.into_owned());
            }
        }
        match value.as_number() {
            Some(n) => self.add_number(n),
            None => self.add_non_number(),
        }
    }

    /// Adds a numeric value to the accumulator.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.count_numbers += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        if self.keep_samples {
            self.samples.push(value);
        }
    }

    /// Adds a non-numeric value (only increments count).
    pub fn add_non_number(&mut self) {
        self.count += 1;
    }

    /// Computes the final aggregate value.
    pub fn compute(&self, aggregation: AggregatorType) -> f64 {
        match aggregation {
            AggregatorType::Count => self.count as f64,
            AggregatorType::DistinctCount => self.distinct.len() as f64,
            AggregatorType::Sum => self.sum,
            AggregatorType::Avg => {
                if self.count_numbers > 0 {
                    self.sum / (self.count_numbers as f64)
                } else {
                    0.0
                }
            }
            AggregatorType::Min => self.min.unwrap_or(0.0),
            AggregatorType::Max => self.max.unwrap_or(0.0),
            AggregatorType::Median => median(&self.samples),
        }
    }
}

/// Median of an unsorted population; 0 when empty.
fn median(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Computes `aggregator` of `field` over `records`.
///
/// `count` ignores the field entirely; `distinctCount` compares values by
/// their string form and skips nulls.
pub fn aggregate<'r, I>(records: I, field: &str, aggregator: AggregatorType) -> f64
where
    I: IntoIterator<Item = &'r Record>,
{
    if aggregator == AggregatorType::Count {
        return records.into_iter().count() as f64;
    }

    let mut acc = AggregateAccumulator::for_aggregator(aggregator);
    for record in records {
        acc.add(record.get(field));
    }
    acc.compute(aggregator)
}
