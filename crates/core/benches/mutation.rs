use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sitegraft_core::{Document, Mutator};

fn bench_parse(c: &mut Criterion) {
    let small = std::fs::read_to_string("../../tests/fixtures/site/blog/post.htm").unwrap();
    let medium = std::fs::read_to_string("../../tests/fixtures/site/index.html").unwrap();
    let large = medium.repeat(200);

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("small", "post"), &small, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("medium", "index"), &medium, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("large", "index x200"), &large, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.finish();
}

fn bench_mutate(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/site/index.html").unwrap();
    let mutator = Mutator::new();
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("mutate_html", |b| {
        b.iter(|| mutator.mutate_html(black_box(&html), black_box("sourdough"), &mut rng))
    });
}

fn bench_mutate_large(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/site/index.html").unwrap().repeat(200);
    let mutator = Mutator::new();
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("mutate_html_large", |b| {
        b.iter(|| mutator.mutate_html(black_box(&html), black_box("sourdough"), &mut rng))
    });
}

criterion_group!(benches, bench_parse, bench_mutate, bench_mutate_large);
criterion_main!(benches);
