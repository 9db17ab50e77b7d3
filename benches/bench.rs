//! Criterion benchmarks for Tastebud.
//!
//! Covers the review pipeline, vectorization, classification and the end to
//! end prediction path.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use tastebud::analysis::analyzer::ReviewAnalyzer;
use tastebud::inference::SentimentPredictor;
use tastebud::ml::naive_bayes::MultinomialNb;
use tastebud::ml::tfidf::{TfIdfConfig, TfIdfVectorizer};

/// Generate labeled reviews for benchmarking.
fn generate_reviews(count: usize) -> (Vec<String>, Vec<u8>) {
    let positive = [
        "great", "delicious", "friendly", "amazing", "fresh", "loved", "wonderful", "tasty",
    ];
    let negative = [
        "terrible", "rude", "cold", "bland", "awful", "slow", "dirty", "disgusting",
    ];
    let neutral = [
        "food", "service", "staff", "pizza", "place", "waiter", "menu", "prices", "was", "the",
    ];

    let mut reviews = Vec::with_capacity(count);
    let mut labels = Vec::with_capacity(count);
    for i in 0..count {
        let label = (i % 2) as u8;
        let words = if label == 1 { &positive } else { &negative };
        let length = 6 + (i % 10);
        let review: Vec<&str> = (0..length)
            .map(|j| {
                if j % 3 == 0 {
                    words[(i * 7 + j) % words.len()]
                } else {
                    neutral[(i * 13 + j * 5) % neutral.len()]
                }
            })
            .collect();
        reviews.push(format!("{}!", review.join(" ")));
        labels.push(label);
    }
    (reviews, labels)
}

fn fitted(reviews: &[String], labels: &[u8]) -> SentimentPredictor {
    let analyzer = ReviewAnalyzer::new().unwrap();
    let corpus: Vec<String> = reviews.iter().map(|r| analyzer.process(r).unwrap()).collect();
    let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default()).unwrap();
    let x = vectorizer.fit_transform(&corpus).unwrap();
    let mut model = MultinomialNb::new(1.0).unwrap();
    model.fit(&x, labels).unwrap();
    SentimentPredictor::new(analyzer, vectorizer, model).unwrap()
}

/// Benchmark the review pipeline.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let analyzer = ReviewAnalyzer::new().unwrap();
    let (reviews, _) = generate_reviews(1000);

    group.bench_function("process_single_review", |b| {
        b.iter(|| black_box(analyzer.process(black_box(&reviews[0]))))
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("process_batch_reviews", |b| {
        b.iter(|| {
            for review in reviews.iter().take(100) {
                let _ = black_box(analyzer.process(black_box(review)));
            }
        })
    });

    group.finish();
}

/// Benchmark vectorizer fitting and transformation.
fn bench_vectorizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorizer");
    group.sample_size(20);

    let analyzer = ReviewAnalyzer::new().unwrap();
    let (reviews, _) = generate_reviews(1000);
    let corpus: Vec<String> = reviews.iter().map(|r| analyzer.process(r).unwrap()).collect();

    group.throughput(Throughput::Elements(corpus.len() as u64));
    group.bench_function("fit_1000_reviews", |b| {
        b.iter(|| {
            let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default()).unwrap();
            vectorizer.fit(black_box(&corpus)).unwrap();
            black_box(vectorizer)
        })
    });

    let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default()).unwrap();
    vectorizer.fit(&corpus).unwrap();
    group.throughput(Throughput::Elements(1));
    group.bench_function("transform_single", |b| {
        b.iter(|| black_box(vectorizer.transform(black_box(&corpus[3]))))
    });

    group.finish();
}

/// Benchmark end to end prediction.
fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");

    let (reviews, labels) = generate_reviews(1000);
    let predictor = fitted(&reviews, &labels);

    group.bench_function("predict_one", |b| {
        b.iter(|| black_box(predictor.predict_one(black_box("The pizza was great but the waiter was rude"))))
    });

    let batch: Vec<&str> = reviews.iter().take(100).map(String::as_str).collect();
    group.throughput(Throughput::Elements(batch.len() as u64));
    group.bench_function("predict_batch_100", |b| {
        b.iter(|| black_box(predictor.predict_batch(black_box(&batch))))
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_vectorizer, bench_predict);
criterion_main!(benches);
