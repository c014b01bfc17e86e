//! FILENAME: core/pivot-engine/benches/pivot_calculations.rs
//! Filter + pivot throughput over a synthetic substation dataset.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::{apply, ColumnSpec, FilterSpec, FilterValue, Row};
use pivot_engine::{aggregate, cross_tabulate, AggregationType, PivotConfig};

const COUNTIES: &[&str] = &["Kent", "Surrey", "Essex", "Sussex", "Hampshire", "Berkshire"];
const VOLTAGES: &[f64] = &[11.0, 33.0, 66.0, 132.0];

fn dataset(rows: usize) -> Vec<Row> {
    (0..rows)
        .map(|i| {
            Row::new()
                .with("site_name", format!("Site {}", i))
                .with("county", COUNTIES[i % COUNTIES.len()])
                .with("site_voltage", VOLTAGES[i % VOLTAGES.len()])
                .with("generation_headroom_mw", ((i * 37) % 120) as f64 - 40.0)
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let rows = dataset(50_000);
    let mut spec = FilterSpec::new().with("county", FilterValue::any_of(["kent", "essex"]));
    spec.set_global("1");

    c.bench_function("filter_50k_rows", |b| {
        b.iter(|| black_box(apply(&rows, &spec, &ColumnSpec::all())));
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let rows = dataset(50_000);
    let config = PivotConfig::new()
        .row("county")
        .row("site_voltage")
        .value("generation_headroom_mw", AggregationType::Sum)
        .value("generation_headroom_mw", AggregationType::Average)
        .value("generation_headroom_mw", AggregationType::Max);

    c.bench_function("aggregate_50k_rows", |b| {
        b.iter(|| black_box(aggregate(&rows, &config)));
    });
}

fn bench_cross_tabulate(c: &mut Criterion) {
    let rows = dataset(50_000);
    let config = PivotConfig::new()
        .row("county")
        .column("site_voltage")
        .value("generation_headroom_mw", AggregationType::Count);

    c.bench_function("cross_tabulate_50k_rows", |b| {
        b.iter(|| black_box(cross_tabulate(&rows, &config)));
    });
}

criterion_group!(benches, bench_filter, bench_aggregate, bench_cross_tabulate);
criterion_main!(benches);
