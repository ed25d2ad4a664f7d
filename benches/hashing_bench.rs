//! Hashing performance benchmarks
//!
//! Criterion benchmarks for the digest function and for a full search at a
//! small difficulty.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pow_sim_rs::miner::hash::{calculate_hash, meets_difficulty};
use pow_sim_rs::{Config, MiningController};
use std::time::Duration;

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    group.throughput(Throughput::Elements(1));

    group.bench_function("sha256_short_payload", |b| {
        b.iter(|| calculate_hash(black_box("Block data"), black_box(86414)))
    });

    let long = "x".repeat(1024);
    group.bench_function("sha256_1k_payload", |b| {
        b.iter(|| calculate_hash(black_box(&long), black_box(86414)))
    });

    group.bench_function("meets_difficulty", |b| {
        let digest = calculate_hash("Block data", 86414);
        b.iter(|| meets_difficulty(black_box(&digest), black_box(4)))
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for difficulty in [1u32, 2, 3] {
        group.bench_with_input(
            BenchmarkId::new("find_block", difficulty),
            &difficulty,
            |b, &difficulty| {
                let controller = MiningController::new(Config {
                    difficulty,
                    ..Config::default()
                })
                .unwrap();
                b.iter(|| {
                    controller.start("Block data").unwrap();
                    controller.wait_for_block(Duration::from_secs(30));
                    controller.stop().unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_digest, bench_search);
criterion_main!(benches);
