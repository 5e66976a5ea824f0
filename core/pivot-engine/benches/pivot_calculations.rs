//! FILENAME: core/pivot-engine/benches/pivot_calculations.rs
//! Criterion benchmarks for the compile step at interactive data sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pivot_engine::{
    compile, flatten, AggregatorType, CustomBucket, FilterCondition, PivotConfig, PivotValue,
    Record,
};

const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];
const QUARTERS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

fn generate_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new()
                .with("Region", REGIONS[i % REGIONS.len()])
                .with("Quarter", QUARTERS[(i / 7) % QUARTERS.len()])
                .with("Customer", format!("C{}", i % 997))
                .with("Sales", ((i * 37) % 1000) as f64)
        })
        .collect()
}

fn generate_config() -> PivotConfig {
    let mut config = PivotConfig::new();
    for region in REGIONS {
        config.custom_rows.push(
            CustomBucket::new(region, region).with_filter(FilterCondition::is_in("Region", [region])),
        );
    }
    for quarter in QUARTERS {
        config.custom_cols.push(
            CustomBucket::new(quarter, quarter)
                .with_filter(FilterCondition::is_in("Quarter", [quarter])),
        );
    }
    config.custom_rows.push(
        CustomBucket::new("mid", "Mid sales").with_filter(FilterCondition::between("Sales", 250.0, 750.0)),
    );
    config.values.push(PivotValue::new("sum", "Sales", AggregatorType::Sum));
    config.values.push(PivotValue::new("median", "Sales", AggregatorType::Median));
    config.values.push(PivotValue::new("customers", "Customer", AggregatorType::DistinctCount));
    config
}

fn bench_compile(c: &mut Criterion) {
    let config = generate_config();
    let mut group = c.benchmark_group("compile");
    for size in [1_000usize, 10_000, 50_000] {
        let records = generate_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| compile(black_box(records), black_box(&config)))
        });
    }
    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let records = generate_records(10_000);
    let result = compile(&records, &generate_config());
    c.bench_function("flatten", |b| b.iter(|| flatten(black_box(&result))));
}

criterion_group!(benches, bench_compile, bench_flatten);
criterion_main!(benches);
