//! Benchmarks for the hot non-network paths of the LLM core.
//!
//! Run with: cargo bench -p nutri-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nutri_core::llm::{extract_json, LlmResponse, ResultCache};
use nutri_core::meal::{compute_health_score, Macronutrients};

const FENCED: &str = "Here is the analysis you asked for:\n```json\n{\"dish_name\": \"Pad Thai\", \"ingredients\": [{\"name\": \"rice noodles\", \"portion_count\": 1, \"grams\": 150}, {\"name\": \"shrimp\", \"portion_count\": 6, \"grams\": 12}], \"macronutrients\": {\"calories\": 620, \"protein\": 28, \"carbs\": 80, \"fats\": 20}}\n```\nLet me know if you need anything else.";

const BARE: &str = "Sure! {\"calories\": 2100, \"protein\": 140, \"carbs\": 230, \"fats\": 70} Hope that helps.";

fn benchmark_extract_json(c: &mut Criterion) {
    c.bench_function("extract_json_fenced", |b| {
        b.iter(|| extract_json(black_box(Some(FENCED))))
    });

    c.bench_function("extract_json_bare", |b| {
        b.iter(|| extract_json(black_box(Some(BARE))))
    });
}

fn benchmark_cache(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cache = ResultCache::in_memory(100);
    let response = LlmResponse::completed(FENCED.to_string(), 120, extract_json(Some(FENCED)));

    rt.block_on(async {
        for i in 0..100 {
            cache.put(format!("/uploads/{i}.jpg"), response.clone()).await;
        }
    });

    c.bench_function("cache_get_hit", |b| {
        b.iter(|| rt.block_on(cache.get(black_box("/uploads/50.jpg"))))
    });

    // Each put past capacity evicts the oldest entry
    let mut n = 100u64;
    c.bench_function("cache_put_evict", |b| {
        b.iter(|| {
            n += 1;
            rt.block_on(cache.put(format!("/uploads/{n}.jpg"), response.clone()))
        })
    });
}

fn benchmark_health_score(c: &mut Criterion) {
    let macros = Macronutrients {
        calories: Some(620.0),
        protein: Some(28.0),
        carbs: Some(80.0),
        fat: Some(20.0),
        fiber: Some(4.0),
        saturated_fat: Some(3.5),
    };

    c.bench_function("compute_health_score", |b| {
        b.iter(|| compute_health_score(black_box(&macros)))
    });
}

criterion_group!(
    benches,
    benchmark_extract_json,
    benchmark_cache,
    benchmark_health_score,
);
criterion_main!(benches);
