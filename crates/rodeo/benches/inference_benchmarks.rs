//! Classifier and schema generation benchmarks.
//!
//! Measures per-value classification and full CSV schema generation,
//! including predictor dispatch on long text values.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rodeo::generate::CsvSchemaGenerator;
use rodeo::{classify, DataTable, PredictorRegistry, SchemaOptions};

/// A mix of values hitting every branch of the classifier.
fn sample_values() -> Vec<&'static str> {
    vec![
        "42",
        "-17",
        "007",
        "3.14159",
        "1e-9",
        "2023-05-01",
        "05/01/2023",
        "2023/02/30",
        "TRUE",
        "no",
        "",
        "Category_7",
        "What a wonderful, delicious meal. I loved every bite!",
        "Born 1998 in a small town",
    ]
}

/// Synthetic header + first row with the given number of columns.
fn generate_table(cols: usize) -> DataTable {
    let values = sample_values();
    let headers = (0..cols).map(|i| format!("column_{}", i + 1)).collect();
    let row = (0..cols)
        .map(|i| values[i % values.len()].to_string())
        .collect();
    DataTable::new(headers, vec![row], b',')
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let values = sample_values();

    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("mixed_values", |b| {
        b.iter(|| {
            for value in &values {
                black_box(classify(black_box(value)));
            }
        })
    });

    group.finish();
}

fn bench_schema_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_generation");
    let registry = PredictorRegistry::new();
    let options = SchemaOptions::default();

    for cols in [10, 100, 1_000].iter() {
        let table = generate_table(*cols);

        group.throughput(Throughput::Elements(*cols as u64));
        group.bench_with_input(BenchmarkId::new("columns", cols), &table, |b, table| {
            b.iter(|| {
                black_box(CsvSchemaGenerator::schema_from_table(
                    black_box(table),
                    &registry,
                    &options,
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_schema_generation);
criterion_main!(benches);
