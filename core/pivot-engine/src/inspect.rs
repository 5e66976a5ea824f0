//! FILENAME: core/pivot-engine/src/inspect.rs
//! Field inspection helpers for the configuration UI.

use std::collections::BTreeSet;

use crate::definition::{AggregatorType, CustomBucket, PivotConfig, PivotValue};
use crate::record::{FieldValue, Record};

/// Sorted distinct string forms of `field`, nulls and missing values skipped.
pub fn unique_values(records: &[Record], field: &str) -> Vec<String> {
    records
        .iter()
        .map(|record| record.get(field))
        .filter(|value| !value.is_null())
        .map(|value| value.to_text().into_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Field names of the first record, in source order.
pub fn field_names(records: &[Record]) -> Vec<String> {
    records
        .first()
        .map(|first| first.field_names().map(str::to_string).collect())
        .unwrap_or_default()
}

/// A starting configuration for freshly loaded data: one unfiltered row
/// bucket named after the first text field (or the first field), and a sum
/// over the first numeric field when there is one.
pub fn suggest_config(records: &[Record]) -> PivotConfig {
    let Some(first) = records.first() else {
        return PivotConfig::new();
    };

    let row_field = first
        .iter()
        .find(|(_, value)| matches!(value, FieldValue::Text(_)))
        .or_else(|| first.iter().next())
        .map(|(name, _)| name);
    let value_field = first
        .iter()
        .find(|(_, value)| matches!(value, FieldValue::Number(_)))
        .map(|(name, _)| name);

    let mut config = PivotConfig::new();
    if let Some(name) = row_field {
        config.custom_rows.push(CustomBucket::new("default_row", name));
    }
    if let Some(name) = value_field {
        config.values.push(PivotValue::new("val_1", name, AggregatorType::Sum));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("id", 3.0).with("city", "Oslo").with("amt", 12.5),
            Record::new().with("id", 1.0).with("city", "Bergen").with("amt", 4.0),
            Record::new().with("id", 2.0).with("city", "Oslo"),
            Record::new().with("id", 2.0).with("city", FieldValue::Null),
        ]
    }

    #[test]
    fn test_unique_values_sorted_without_nulls() {
        let data = records();
        assert_eq!(unique_values(&data, "city"), vec!["Bergen", "Oslo"]);
        assert_eq!(unique_values(&data, "id"), vec!["1", "2", "3"]);
        assert_eq!(unique_values(&data, "amt"), vec!["12.5", "4"]);
        assert!(unique_values(&data, "nope").is_empty());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(field_names(&records()), vec!["id", "city", "amt"]);
        assert!(field_names(&[]).is_empty());
    }

    #[test]
    fn test_suggest_config() {
        let config = suggest_config(&records());
        assert_eq!(config.custom_rows.len(), 1);
        assert_eq!(config.custom_rows[0].id, "default_row");
        assert_eq!(config.custom_rows[0].label, "city");
        assert!(config.custom_rows[0].filters.is_empty());
        assert_eq!(config.values, vec![PivotValue::new("val_1", "id", AggregatorType::Sum)]);
    }

    #[test]
    fn test_suggest_config_without_text_or_numbers() {
        let flags = vec![Record::new().with("flag", true)];
        let config = suggest_config(&flags);
        assert_eq!(config.custom_rows[0].label, "flag");
        assert!(config.values.is_empty());

        assert_eq!(suggest_config(&[]), PivotConfig::new());
    }
}
