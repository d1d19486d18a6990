//! Benchmarks for topic matching

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stock_market::bus::BindingKey;

fn bench_topic_match(c: &mut Criterion) {
    let star = BindingKey::parse("*");
    let hash = BindingKey::parse("#");
    let nested = BindingKey::parse("nyse.#.trade");

    c.bench_function("match_star", |b| b.iter(|| star.matches(black_box("SBUX"))));
    c.bench_function("match_hash", |b| b.iter(|| hash.matches(black_box("SBUX"))));
    c.bench_function("match_nested", |b| {
        b.iter(|| nested.matches(black_box("nyse.equities.SBUX.trade")))
    });
}

criterion_group!(benches, bench_topic_match);
criterion_main!(benches);
