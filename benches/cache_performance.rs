use catalog_cache::DatasetCache;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

fn sample_document(items: usize) -> Value {
    json!({
        "models": (0..items)
            .map(|i| json!({"id": i, "name": format!("model-{i}")}))
            .collect::<Vec<_>>()
    })
}

fn dataset_cache_benchmarks(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("dataset_cache");

    // Insert + read back, for different document sizes
    for item_count in [10usize, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("insert_get", item_count),
            item_count,
            |b, &count| {
                let doc = sample_document(count);
                b.iter(|| {
                    rt.block_on(async {
                        let cache = DatasetCache::new(Duration::from_secs(900));
                        let now = Instant::now();
                        cache.insert("models", doc.clone(), now).await;
                        let result = cache.get("models", now).await;
                        black_box(result);
                    })
                })
            },
        );
    }

    // Repeated hits against a warm entry
    group.bench_function("warm_hits", |b| {
        let cache = rt.block_on(async {
            let cache = DatasetCache::new(Duration::from_secs(900));
            cache.insert("models", sample_document(100), Instant::now()).await;
            cache
        });
        b.iter(|| {
            rt.block_on(async {
                let result = cache.get("models", Instant::now()).await;
                black_box(result);
            })
        })
    });

    // Sweep over a store where half the entries are stale
    group.bench_function("sweep_half_stale", |b| {
        b.iter(|| {
            rt.block_on(async {
                let ttl = Duration::from_secs(60);
                let cache = DatasetCache::new(ttl);
                let base = Instant::now();
                for i in 0..100 {
                    let fetched_at = if i % 2 == 0 { base } else { base + ttl };
                    cache
                        .insert(&format!("dataset-{i}"), json!({"id": i}), fetched_at)
                        .await;
                }
                let removed = cache.sweep(base + ttl + Duration::from_secs(1)).await;
                black_box(removed);
            })
        })
    });

    group.finish();
}

criterion_group!(benches, dataset_cache_benchmarks);
criterion_main!(benches);
