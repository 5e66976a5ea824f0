//! FILENAME: tests/common/mod.rs
//! Fixtures shared by the pivot-engine integration tests.

#![allow(dead_code)]

use pivot_engine::{
    AggregatorType, CustomBucket, FilterCondition, PivotConfig, PivotValue, Record,
};

/// Sales data: (region, product, quarter, amount, quantity).
pub struct SalesFixture;

impl SalesFixture {
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64)> {
        vec![
            ("North", "Apples", "Q1", 100.0, 10.0),
            ("North", "Oranges", "Q1", 150.0, 15.0),
            ("North", "Apples", "Q2", 120.0, 12.0),
            ("South", "Apples", "Q1", 200.0, 20.0),
            ("South", "Oranges", "Q2", 250.0, 25.0),
            ("East", "Apples", "Q2", 80.0, 8.0),
            ("East", "Oranges", "Q1", 90.0, 9.0),
            ("West", "Oranges", "Q2", 300.0, 30.0),
        ]
    }

    pub fn records() -> Vec<Record> {
        Self::data()
            .into_iter()
            .map(|(region, product, quarter, sales, quantity)| {
                Record::new()
                    .with("Region", region)
                    .with("Product", product)
                    .with("Quarter", quarter)
                    .with("Sales", sales)
                    .with("Quantity", quantity)
            })
            .collect()
    }
}

/// Three-record dataset used by the small scenarios.
pub fn east_west_records() -> Vec<Record> {
    vec![
        Record::new().with("region", "east").with("amt", 10.0),
        Record::new().with("region", "east").with("amt", 5.0),
        Record::new().with("region", "west").with("amt", 7.0),
    ]
}

pub fn bucket_in(id: &str, label: &str, field: &str, values: &[&str]) -> CustomBucket {
    CustomBucket::new(id, label).with_filter(FilterCondition::is_in(field, values.iter().copied()))
}

pub fn config_with(rows: Vec<CustomBucket>, cols: Vec<CustomBucket>, values: Vec<PivotValue>) -> PivotConfig {
    PivotConfig {
        custom_rows: rows,
        custom_cols: cols,
        values,
        ..PivotConfig::default()
    }
}

pub fn sum_of(id: &str, field: &str) -> PivotValue {
    PivotValue::new(id, field, AggregatorType::Sum)
}
