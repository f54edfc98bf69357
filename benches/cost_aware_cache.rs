use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use zarrs_serve::cache::{CostAwareCache, CostCache};

fn cost_aware_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_aware_cache");
    for entries in [100u64, 1_000, 10_000] {
        let keys: Vec<String> = (0..entries).map(|i| format!("dataset/var/{i}.0")).collect();

        group.bench_function(BenchmarkId::new("put_evict", entries), |b| {
            let cache = CostAwareCache::new(entries * 50);
            b.iter(|| {
                for (i, key) in (0u64..).zip(&keys) {
                    cache.put(key.clone(), i, Duration::from_micros(i % 100), 100);
                }
            });
        });

        let cache = CostAwareCache::new(entries * 100);
        for (i, key) in (0u64..).zip(&keys) {
            cache.put(key.clone(), i, Duration::from_micros(i % 100), 100);
        }
        group.bench_function(BenchmarkId::new("get", entries), |b| {
            b.iter(|| {
                for key in &keys {
                    cache.get(key);
                }
            });
        });
    }
}

criterion_group!(benches, cost_aware_cache);
criterion_main!(benches);
