use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use stride_engine::config::StreakConfig;
use stride_engine::services::StreakEngine;
use stride_engine::store::MemoryStore;
use stride_engine::time_utils::days_inclusive;

const DENSE_USER: u64 = 1;
const SPARSE_USER: u64 = 2;

fn benchmark_recalculate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to build runtime");

    // Seed a full year of history once: one user active every day, one
    // active every third day with occasional journals.
    let store = Arc::new(MemoryStore::new());
    let start: NaiveDate = "2024-01-01".parse().expect("valid date");
    let today: NaiveDate = "2024-12-31".parse().expect("valid date");
    for (i, date) in days_inclusive(start, today).enumerate() {
        store.record_task(DENSE_USER, date);
        match i % 3 {
            0 => store.record_task(SPARSE_USER, date),
            1 => store.record_journal(SPARSE_USER, date),
            _ => {}
        }
    }

    let engine = StreakEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        StreakConfig::default(),
    );

    let mut group = c.benchmark_group("recalculate_streak");

    group.bench_function("dense_year", |b| {
        b.iter(|| {
            rt.block_on(engine.recalculate_streak(black_box(DENSE_USER), black_box(today)))
                .expect("recalculation failed")
        })
    });

    group.bench_function("sparse_year", |b| {
        b.iter(|| {
            rt.block_on(engine.recalculate_streak(black_box(SPARSE_USER), black_box(today)))
                .expect("recalculation failed")
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_recalculate);
criterion_main!(benches);
