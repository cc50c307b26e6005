//! Criterion benchmarks for callstat-core.
//!
//! These exercise the pure-Rust engine and need no Python runtime.
//!
//! ## Benchmark groups
//!
//! 1. **aggregate**: unfiltered and filtered statistics at several sizes.
//! 2. **group_similar**: cross-source grouping, sequential vs. fanned out.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/callstat-core/Cargo.toml
//! cargo bench --manifest-path crates/callstat-core/Cargo.toml -- group_similar
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use _callstat_core::analytics::build_groups;
use _callstat_core::{aggregate, CallFilter, CallRecord};

const APPS: [&str; 4] = ["Phone", "Viber", "WhatsApp", "Telegram"];
const NAMES: [&str; 5] = ["Anna", "Boris", "Vera", "Gleb", "Dina"];

/// Synthetic call history spread over a month and `sources` batches.
fn synthetic_calls(n: usize, sources: usize) -> Vec<CallRecord> {
    (0..n)
        .map(|i| CallRecord {
            kind: Some(if i % 3 == 0 { "outgoing" } else { "incoming" }.to_string()),
            app: Some(APPS[i % APPS.len()].to_string()),
            number: Some(format!("7999{:07}", i % 997)),
            duration: (i % 11 != 0).then(|| (i % 600) as f64),
            timestamp: Some(format!(
                "2024-01-{:02}T{:02}:{:02}:00",
                i % 28 + 1,
                i % 24,
                i % 60
            )),
            status: Some("answered".to_string()),
            name: Some(NAMES[i % NAMES.len()].to_string()),
            source: Some(format!("batch-{}", i % sources.max(1))),
            country: (i % 4 == 0).then(|| "Russia".to_string()),
            city: None,
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let filter = CallFilter {
        kind: Some("incoming".to_string()),
        start_time: Some("2024-01-05".to_string()),
        end_time: Some("2024-01-20".to_string()),
        ..Default::default()
    };

    for size in [1_000usize, 10_000, 100_000] {
        let calls = synthetic_calls(size, 1);
        group.bench_with_input(BenchmarkId::new("unfiltered", size), &calls, |b, calls| {
            b.iter(|| aggregate(black_box(calls), None).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("filtered", size), &calls, |b, calls| {
            b.iter(|| aggregate(black_box(calls), Some(&filter)).unwrap())
        });
    }
    group.finish();
}

fn bench_group_similar(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_similar");
    for size in [1_000usize, 10_000, 50_000] {
        let calls = synthetic_calls(size, 4);
        group.bench_with_input(BenchmarkId::new("sequential", size), &calls, |b, calls| {
            b.iter(|| build_groups(black_box(calls), false))
        });
        group.bench_with_input(BenchmarkId::new("fanned_out", size), &calls, |b, calls| {
            b.iter(|| build_groups(black_box(calls), true))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_group_similar);
criterion_main!(benches);
