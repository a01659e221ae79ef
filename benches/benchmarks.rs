//! Benchmarks for pagination and assembly

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flipbook::book::assemble;
use flipbook::{
    paginate_text, Book, BookConfig, CachedMeasurer, ContentStore, GridMeasurer, MetricsMeasurer,
    PageBudget, PaginationCache, PendingPolicy, StyleProfile, Viewport,
};

fn default_budget() -> PageBudget {
    PageBudget::new(480.0, 640.0, 24.0, 40.0)
}

fn topic_text(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            format!(
                "Paragraph {} contains enough text to span multiple lines and test the greedy packing of logical lines.",
                i
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn sample_store(chapters: usize, topics: usize) -> ContentStore {
    let mut store = ContentStore::new();
    for c in 0..chapters {
        for t in 0..topics {
            store.upsert_topic(&format!("Chapter {}", c), &format!("Topic {}", t), &topic_text(20));
        }
    }
    store
}

fn bench_paginate_grid(c: &mut Criterion) {
    c.bench_function("paginate_topic_grid", |b| {
        let text = topic_text(50);
        let budget = default_budget();
        let style = StyleProfile::default();
        let mut measurer = GridMeasurer::new(8.0, 24.0);

        b.iter(|| {
            black_box(paginate_text(black_box(&text), &budget, &mut measurer, &style).unwrap());
        });
    });
}

fn bench_paginate_metrics(c: &mut Criterion) {
    c.bench_function("paginate_topic_metrics", |b| {
        let text = topic_text(50);
        let budget = default_budget();
        let style = StyleProfile::default();
        let mut measurer = MetricsMeasurer::default();

        b.iter(|| {
            black_box(paginate_text(black_box(&text), &budget, &mut measurer, &style).unwrap());
        });
    });
}

fn bench_paginate_cached(c: &mut Criterion) {
    c.bench_function("paginate_topic_cached", |b| {
        let text = topic_text(50);
        let budget = default_budget();
        let style = StyleProfile::default();
        let mut measurer = CachedMeasurer::new(MetricsMeasurer::default());

        b.iter(|| {
            black_box(paginate_text(black_box(&text), &budget, &mut measurer, &style).unwrap());
        });
    });
}

fn bench_assemble(c: &mut Criterion) {
    c.bench_function("assemble_book", |b| {
        let store = sample_store(10, 8);
        let mut cache = PaginationCache::new();
        cache.set_layout(default_budget(), &StyleProfile::default());
        cache
            .refresh(&store, &mut GridMeasurer::new(8.0, 24.0))
            .unwrap();

        b.iter(|| {
            black_box(assemble(&store, cache.results(), PendingPolicy::Withhold, 1).unwrap());
        });
    });
}

fn bench_edit_and_recompute(c: &mut Criterion) {
    c.bench_function("edit_one_topic_recompute", |b| {
        let config = BookConfig {
            initial_viewport: Viewport::new(480.0, 640.0),
            ..BookConfig::default()
        };
        let mut book = Book::with_store(config, sample_store(10, 8));
        let mut measurer = GridMeasurer::new(8.0, 24.0);
        book.recompute(&mut measurer).unwrap();

        let mut i = 0;
        b.iter(|| {
            i += 1;
            book.upsert_topic("Chapter 3", "Topic 2", &topic_text(20 + i % 5));
            black_box(book.recompute(&mut measurer).unwrap());
        });
    });
}

fn bench_resize_recompute(c: &mut Criterion) {
    c.bench_function("resize_full_recompute", |b| {
        let mut book = Book::with_store(BookConfig::default(), sample_store(4, 5));
        let mut measurer = GridMeasurer::new(8.0, 24.0);
        book.recompute(&mut measurer).unwrap();

        let mut tall = false;
        b.iter(|| {
            tall = !tall;
            let height = if tall { 720.0 } else { 640.0 };
            book.resize(480.0, height);
            black_box(book.recompute(&mut measurer).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_paginate_grid,
    bench_paginate_metrics,
    bench_paginate_cached,
    bench_assemble,
    bench_edit_and_recompute,
    bench_resize_recompute,
);

criterion_main!(benches);
