//! Performance benchmarks for partitioning, joining and BIOM encoding

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use safe_regroup::pipeline::partition;
use safe_regroup::table::{biom, SparseMatrix, Table};
use std::hint::black_box;
use std::time::Duration;

/// Create a features x samples table with roughly `density` of cells filled
fn create_test_table(rows: usize, cols: usize, density: usize) -> Table {
    let triplets: Vec<_> = (0..cols)
        .flat_map(|c| {
            (0..rows)
                .filter(move |r| (r * 31 + c * 17) % 100 < density)
                .map(move |r| (r, c, (r + c) as f64 + 0.5))
        })
        .collect();
    Table::new(
        SparseMatrix::from_triplets(rows, cols, triplets).unwrap(),
        (0..rows).map(|r| format!("UniRef90_{r:06}")).collect(),
        (0..cols).map(|c| format!("SAMPLE_{c:05}")).collect(),
    )
    .unwrap()
}

fn bench_partition(c: &mut Criterion) {
    let table = create_test_table(2000, 1000, 5);

    let mut group = c.benchmark_group("partition");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));

    for chunk_size in [10, 100, 500].iter() {
        group.bench_with_input(
            BenchmarkId::new("chunk_size", chunk_size),
            chunk_size,
            |b, &chunk_size| b.iter(|| partition(black_box(&table), chunk_size).unwrap()),
        );
    }
    group.finish();
}

fn bench_concat(c: &mut Criterion) {
    let table = create_test_table(2000, 1000, 5);

    let mut group = c.benchmark_group("concat");
    for chunk_size in [10, 100].iter() {
        let parts: Vec<Table> = partition(&table, *chunk_size)
            .unwrap()
            .into_iter()
            .map(|chunk| chunk.table)
            .collect();
        group.bench_with_input(BenchmarkId::new("chunks", parts.len()), &parts, |b, parts| {
            b.iter(|| Table::concat(black_box(parts)).unwrap())
        });
    }
    group.finish();
}

fn bench_biom_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("biom");
    for cols in [100, 1000].iter() {
        let table = create_test_table(1000, *cols, 5);
        let json = biom::to_json(&table, "bench").unwrap();

        group.bench_with_input(BenchmarkId::new("encode", cols), &table, |b, table| {
            b.iter(|| biom::to_json(black_box(table), "bench").unwrap())
        });
        group.bench_with_input(BenchmarkId::new("decode", cols), &json, |b, json| {
            b.iter(|| biom::from_json(black_box(json)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_partition, bench_concat, bench_biom_encoding);
criterion_main!(benches);
