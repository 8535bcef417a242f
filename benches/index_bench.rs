//! Benchmarks for Chronolog record indexes
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate, NaiveDateTime};
use chronolog::index::{MemoryIndex, OrderedRecordIndex, SqliteIndex};
use chronolog::storage::{Limit, Record, RecordStore, ScoreRange};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tempfile::tempdir;

fn origin() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// One record per 10ms, so every tenth score holds a record
fn create_test_records(count: usize) -> Vec<(i64, Record)> {
    (0..count)
        .map(|i| {
            let record = Record::generate(
                origin() + Duration::milliseconds(i as i64 * 10),
                format!("record {}", i),
            );
            (i as i64 * 10, record)
        })
        .collect()
}

fn populate(index: &dyn OrderedRecordIndex, records: &[(i64, Record)]) {
    for (score, record) in records {
        index.insert(*score, record.clone()).unwrap();
    }
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [100, 1000] {
        let records = create_test_records(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("memory_{}", size), |b| {
            b.iter(|| {
                let index = MemoryIndex::new();
                populate(&index, black_box(&records));
            })
        });

        group.bench_function(format!("sqlite_{}", size), |b| {
            b.iter(|| {
                let index = SqliteIndex::in_memory().unwrap();
                populate(&index, black_box(&records));
            })
        });
    }

    group.finish();
}

fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    let records = create_test_records(10_000);

    let memory = MemoryIndex::new();
    populate(&memory, &records);

    let dir = tempdir().unwrap();
    let sqlite = SqliteIndex::open(dir.path()).unwrap();
    populate(&sqlite, &records);

    // 1000 records out of 10000
    let range = ScoreRange::try_new(40_000, 49_990).unwrap();
    group.throughput(Throughput::Elements(1000));

    group.bench_function("memory_1000_of_10000", |b| {
        b.iter(|| memory.range_inclusive(black_box(range), Limit::Unbounded).unwrap())
    });

    group.bench_function("sqlite_1000_of_10000", |b| {
        b.iter(|| sqlite.range_inclusive(black_box(range), Limit::Unbounded).unwrap())
    });

    group.bench_function("memory_last", |b| {
        b.iter(|| memory.top_by_score_descending(black_box(1)).unwrap())
    });

    group.bench_function("sqlite_last", |b| {
        b.iter(|| sqlite.top_by_score_descending(black_box(1)).unwrap())
    });

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    group.bench_function("save_single", |b| {
        let store = RecordStore::in_memory();
        let mut i = 0i64;

        b.iter(|| {
            i += 1;
            let created = origin() + Duration::milliseconds(i);
            store.save(black_box(Record::generate(created, "bench"))).unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_range, bench_store);
criterion_main!(benches);
