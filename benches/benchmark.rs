// Performance benchmarks for fitting and serving recommendations
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matchx_core::{ProfileCorpus, ProfileRecord};
use matchx_similarity::{FeatureEncoder, RecommenderService};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::sync::Arc;

const GENDERS: &[&str] = &["Male", "Female", "Non-binary", "Transgender"];
const ORIENTATIONS: &[&str] = &["Straight", "Gay", "Lesbian", "Bisexual", "Pansexual"];
const LOCATIONS: &[&str] = &["Boston", "Denver", "Austin", "Seattle", "Chicago"];
const INCOMES: &[&str] = &["Low", "Middle", "High"];
const EDUCATION: &[&str] = &["High School", "Bachelor's", "Master's", "PhD"];
const TAGS: &[&str] = &[
    "hiking", "coffee", "jazz", "chess", "yoga", "travel", "cooking", "gaming", "reading",
    "photography", "running", "painting", "cycling", "movies", "dancing", "baking",
];

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values[rng.random_range(0..values.len())]
}

fn generate_corpus(size: usize) -> ProfileCorpus {
    let mut rng = StdRng::seed_from_u64(42);
    let records = (0..size)
        .map(|i| {
            let tag_count = rng.random_range(1..6);
            let tags: Vec<&str> = (0..tag_count).map(|_| pick(&mut rng, TAGS)).collect();
            ProfileRecord::new(format!("u{}", i), format!("User {}", i))
                .with_gender(pick(&mut rng, GENDERS))
                .with_orientation(pick(&mut rng, ORIENTATIONS))
                .with_age(rng.random_range(18..70))
                .with_location(pick(&mut rng, LOCATIONS))
                .with_income_bracket(pick(&mut rng, INCOMES))
                .with_education_level(pick(&mut rng, EDUCATION))
                .with_interest_tags(tags.join(", "))
        })
        .collect();
    ProfileCorpus::new(records).unwrap()
}

fn benchmark_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(20);

    for size in [1000, 10000].iter() {
        let corpus = generate_corpus(*size);
        group.bench_with_input(BenchmarkId::new("encoder", size), &corpus, |b, corpus| {
            let encoder = FeatureEncoder::default();
            b.iter(|| {
                let fitted = encoder.fit(black_box(corpus)).unwrap();
                black_box(fitted);
            });
        });
    }

    group.finish();
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");

    for size in [1000, 10000].iter() {
        let service = RecommenderService::default();
        service.fit(generate_corpus(*size)).unwrap();

        group.bench_with_input(BenchmarkId::new("top10", size), size, |b, _| {
            b.iter(|| {
                let results = service.recommend(black_box("u7"), 10).unwrap();
                black_box(results);
            });
        });
    }

    group.finish();
}

fn benchmark_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    let service = Arc::new(RecommenderService::default());
    service.fit(generate_corpus(5000)).unwrap();

    group.bench_function("recommend_x10", |b| {
        b.iter(|| {
            use std::thread;
            let handles: Vec<_> = (0..10)
                .map(|i| {
                    let service = service.clone();
                    thread::spawn(move || service.recommend(&format!("u{}", i), 10))
                })
                .collect();

            for handle in handles {
                black_box(handle.join().unwrap().unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_fit, benchmark_recommend, benchmark_concurrent_reads);
criterion_main!(benches);
