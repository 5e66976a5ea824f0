//! FILENAME: core/pivot-engine/src/filter.rs
//! Filter Evaluator - decides whether a record belongs to a bucket.
//!
//! A bucket is the AND of its conditions, evaluated in order with
//! short-circuit. Comparisons go through the record model's coercions:
//! numeric when both sides are numbers, string equality otherwise.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;

use crate::definition::{CustomBucket, FilterCondition, FilterOperator};
use crate::record::{FieldValue, Record, NULL_VALUE};

/// Returns true when `record` satisfies every condition of `bucket`.
/// A bucket without conditions matches everything.
pub fn matches(record: &Record, bucket: &CustomBucket) -> bool {
    bucket
        .filters
        .iter()
        .all(|condition| condition_matches(record, condition))
}

/// Evaluates one condition against one record.
pub fn condition_matches(record: &Record, condition: &FilterCondition) -> bool {
    let value = record.get(&condition.field);

    match condition.operator {
        // An empty list means "field chosen, nothing ticked yet": no constraint.
        FilterOperator::In => {
            condition.values.is_empty() || {
                let text = value.to_text();
                condition.values.iter().any(|v| v.as_str() == text.as_ref())
            }
        }
        FilterOperator::Eq => equals(value, condition.val1.as_ref()),
        FilterOperator::Neq => !equals(value, condition.val1.as_ref()),
        FilterOperator::Gt => compare(value, condition.val1.as_ref()) == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(
            compare(value, condition.val1.as_ref()),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Lt => compare(value, condition.val1.as_ref()) == Some(Ordering::Less),
        FilterOperator::Lte => matches!(
            compare(value, condition.val1.as_ref()),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::Between => {
            let (Some(n), Some(low), Some(high)) = (
                value.as_number(),
                operand_number(condition.val1.as_ref()),
                operand_number(condition.val2.as_ref()),
            ) else {
                return false;
            };
            low <= n && n <= high
        }
    }
}

/// Equality: numeric if both sides are numeric, exact string match otherwise.
/// A missing operand compares as the empty string.
fn equals(value: &FieldValue, operand: Option<&FieldValue>) -> bool {
    let operand = operand.unwrap_or(&NULL_VALUE);
    match (value.as_number(), operand.as_number()) {
        (Some(a), Some(b)) => a == b,
        _ => value.to_text() == operand.to_text(),
    }
}

/// Ordering for gt/gte/lt/lte. None when either side is not numeric.
fn compare(value: &FieldValue, operand: Option<&FieldValue>) -> Option<Ordering> {
    let a = value.as_number()?;
    let b = operand_number(operand)?;
    a.partial_cmp(&b)
}

fn operand_number(operand: Option<&FieldValue>) -> Option<f64> {
    operand.and_then(FieldValue::as_number)
}

// ============================================================================
// GLOBAL ALLOW-LISTS
// ============================================================================

/// Compiled form of the configuration's field -> allowed-values map.
/// Fields with an empty list are dropped up front (unrestricted).
pub struct AllowList<'a> {
    fields: Vec<(&'a str, FxHashSet<&'a str>)>,
}

impl<'a> AllowList<'a> {
    pub fn new<I>(filters: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
    {
        let fields = filters
            .into_iter()
            .filter(|(_, allowed)| !allowed.is_empty())
            .map(|(field, allowed)| {
                (field.as_str(), allowed.iter().map(String::as_str).collect())
            })
            .collect();
        AllowList { fields }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn permits(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .all(|(field, allowed)| allowed.contains(record.get(field).to_text().as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn bucket(condition: FilterCondition) -> CustomBucket {
        CustomBucket::new("b", "Bucket").with_filter(condition)
    }

    #[test]
    fn test_empty_bucket_matches_everything() {
        let empty = CustomBucket::new("all", "All");
        assert!(matches(&Record::new(), &empty));
        assert!(matches(&Record::new().with("x", 1.0), &empty));
    }

    #[test]
    fn test_in_with_empty_values_is_unconstrained() {
        let b = bucket(FilterCondition::is_in("field", Vec::<String>::new()));
        assert!(matches(&Record::new().with("field", "anything"), &b));
        assert!(matches(&Record::new(), &b));
    }

    #[test]
    fn test_in_matches_stringified_value() {
        let b = bucket(FilterCondition::is_in("field", ["x"]));
        assert!(matches(&Record::new().with("field", "x"), &b));
        assert!(!matches(&Record::new().with("field", "y"), &b));
        assert!(!matches(&Record::new(), &b));

        let numeric = bucket(FilterCondition::is_in("year", ["2024"]));
        assert!(matches(&Record::new().with("year", 2024.0), &numeric));
    }

    #[test]
    fn test_in_treats_missing_as_empty_string() {
        let b = bucket(FilterCondition::is_in("field", [""]));
        assert!(matches(&Record::new(), &b));
        assert!(matches(&Record::new().with("field", FieldValue::Null), &b));
    }

    #[test]
    fn test_eq_prefers_numeric_comparison() {
        let b = bucket(FilterCondition::compare("n", FilterOperator::Eq, "10"));
        assert!(matches(&Record::new().with("n", 10.0), &b));
        assert!(matches(&Record::new().with("n", "10.0"), &b));
        assert!(!matches(&Record::new().with("n", 11.0), &b));
    }

    #[test]
    fn test_eq_and_neq_on_text() {
        let eq = bucket(FilterCondition::compare("city", FilterOperator::Eq, "Oslo"));
        let neq = bucket(FilterCondition::compare("city", FilterOperator::Neq, "Oslo"));
        let oslo = Record::new().with("city", "Oslo");
        let bergen = Record::new().with("city", "Bergen");
        assert!(matches(&oslo, &eq));
        assert!(!matches(&bergen, &eq));
        assert!(!matches(&oslo, &neq));
        assert!(matches(&bergen, &neq));
        // Missing value is "" and therefore differs from "Oslo".
        assert!(matches(&Record::new(), &neq));
    }

    #[test]
    fn test_ordering_operators() {
        let r = Record::new().with("n", 5.0);
        let gt = |v: f64| bucket(FilterCondition::compare("n", FilterOperator::Gt, v));
        let gte = |v: f64| bucket(FilterCondition::compare("n", FilterOperator::Gte, v));
        let lt = |v: f64| bucket(FilterCondition::compare("n", FilterOperator::Lt, v));
        let lte = |v: f64| bucket(FilterCondition::compare("n", FilterOperator::Lte, v));

        assert!(matches(&r, &gt(4.0)));
        assert!(!matches(&r, &gt(5.0)));
        assert!(matches(&r, &gte(5.0)));
        assert!(matches(&r, &lt(6.0)));
        assert!(!matches(&r, &lt(5.0)));
        assert!(matches(&r, &lte(5.0)));
    }

    #[test]
    fn test_ordering_fails_on_non_numeric() {
        let gt = bucket(FilterCondition::compare("n", FilterOperator::Gt, 0.0));
        assert!(!matches(&Record::new().with("n", "abc"), &gt));
        assert!(!matches(&Record::new(), &gt));

        let gt_text = bucket(FilterCondition::compare("n", FilterOperator::Gt, "abc"));
        assert!(!matches(&Record::new().with("n", 5.0), &gt_text));
    }

    #[test]
    fn test_between_inclusive() {
        let b = bucket(FilterCondition::between("amt", 10.0, 20.0));
        assert!(matches(&Record::new().with("amt", 15.0), &b));
        assert!(matches(&Record::new().with("amt", 10.0), &b));
        assert!(matches(&Record::new().with("amt", 20.0), &b));
        assert!(!matches(&Record::new().with("amt", 9.0), &b));
        assert!(!matches(&Record::new().with("amt", 21.0), &b));
        assert!(!matches(&Record::new().with("amt", "fifteen"), &b));
        assert!(!matches(&Record::new(), &b));
    }

    #[test]
    fn test_between_without_bounds_fails() {
        let mut condition = FilterCondition::between("amt", 10.0, 20.0);
        condition.val2 = None;
        assert!(!matches(&Record::new().with("amt", 15.0), &bucket(condition)));
    }

    #[test]
    fn test_conditions_are_anded() {
        let b = CustomBucket::new("b", "East big")
            .with_filter(FilterCondition::is_in("region", ["east"]))
            .with_filter(FilterCondition::compare("amt", FilterOperator::Gte, 10.0));
        assert!(matches(&Record::new().with("region", "east").with("amt", 10.0), &b));
        assert!(!matches(&Record::new().with("region", "east").with("amt", 5.0), &b));
        assert!(!matches(&Record::new().with("region", "west").with("amt", 50.0), &b));
    }

    #[test]
    fn test_allow_list() {
        let mut filters = BTreeMap::new();
        filters.insert("region".to_string(), vec!["east".to_string()]);
        filters.insert("product".to_string(), Vec::new());
        let allow = AllowList::new(&filters);

        assert!(!allow.is_unrestricted());
        assert!(allow.permits(&Record::new().with("region", "east").with("product", "a")));
        assert!(!allow.permits(&Record::new().with("region", "west")));
        assert!(!allow.permits(&Record::new()));

        let open: BTreeMap<String, Vec<String>> = BTreeMap::new();
        assert!(AllowList::new(&open).is_unrestricted());
    }
}
