//! Benchmarks comparing the flat containers against std::collections::BTreeMap
//!
//! ## Benchmark Categories:
//! 1. **Construction** - bulk building from unsorted input
//! 2. **Lookup** - point queries on populated containers
//! 3. **Insertion** - sequential hinted inserts vs unhinted vs BTreeMap

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seqmap::{FlatMap, FlatSet};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn shuffled_keys(n: usize) -> Vec<u64> {
    // deterministic pseudo-shuffle, no rng dependency needed
    (0..n as u64).map(|i| (i * 2_654_435_761) % (n as u64 * 4)).collect()
}

fn benchmark_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Construction from unsorted");

    for size in SIZES {
        let keys = shuffled_keys(size);

        group.bench_with_input(BenchmarkId::new("FlatMap", size), &keys, |b, keys| {
            b.iter(|| {
                let map: FlatMap<u64, u64> =
                    keys.iter().map(|&k| (k, k.wrapping_mul(3))).collect();
                black_box(map.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &keys, |b, keys| {
            b.iter(|| {
                let map: BTreeMap<u64, u64> =
                    keys.iter().map(|&k| (k, k.wrapping_mul(3))).collect();
                black_box(map.len())
            });
        });
    }

    group.finish();
}

fn benchmark_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("Point lookup");

    for size in SIZES {
        let keys = shuffled_keys(size);
        let flat: FlatMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
        let tree: BTreeMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();

        group.bench_with_input(BenchmarkId::new("FlatMap", size), &keys, |b, keys| {
            b.iter(|| {
                let mut hits = 0usize;
                for k in keys {
                    if flat.get(black_box(k)).is_some() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &keys, |b, keys| {
            b.iter(|| {
                let mut hits = 0usize;
                for k in keys {
                    if tree.get(black_box(k)).is_some() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });
    }

    group.finish();
}

fn benchmark_sequential_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sequential ascending insert");

    for size in SIZES {
        group.bench_with_input(BenchmarkId::new("FlatMap hinted", size), &size, |b, &n| {
            b.iter(|| {
                let mut map: FlatMap<u64, u64> = FlatMap::new();
                for k in 0..n as u64 {
                    // ascending keys make the tail position the right hint
                    map.insert_hint(map.len(), k, k).unwrap();
                }
                black_box(map.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("FlatMap unhinted", size), &size, |b, &n| {
            b.iter(|| {
                let mut map: FlatMap<u64, u64> = FlatMap::new();
                for k in 0..n as u64 {
                    map.insert(k, k).unwrap();
                }
                black_box(map.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |b, &n| {
            b.iter(|| {
                let mut map: BTreeMap<u64, u64> = BTreeMap::new();
                for k in 0..n as u64 {
                    map.insert(k, k);
                }
                black_box(map.len())
            });
        });
    }

    group.finish();
}

fn benchmark_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("Full scan");

    for size in SIZES {
        let keys = shuffled_keys(size);
        let flat: FlatMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
        let tree: BTreeMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();

        group.bench_with_input(BenchmarkId::new("FlatMap", size), &(), |b, _| {
            b.iter(|| {
                let sum: u64 = flat.values().sum();
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &(), |b, _| {
            b.iter(|| {
                let sum: u64 = tree.values().sum();
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn benchmark_set_membership(c: &mut Criterion) {
    let mut group = c.benchmark_group("Set membership");

    for size in SIZES {
        let keys = shuffled_keys(size);
        let set: FlatSet<u64> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("FlatSet", size), &keys, |b, keys| {
            b.iter(|| {
                let mut hits = 0usize;
                for k in keys {
                    if set.contains(black_box(k)) {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_construction,
    benchmark_lookup,
    benchmark_sequential_insert,
    benchmark_iteration,
    benchmark_set_membership
);
criterion_main!(benches);
