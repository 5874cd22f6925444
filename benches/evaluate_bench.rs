// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Benchmarks for expression evaluation.
//!
//! THEN retries every prefix length, so its cost grows with the square of
//! the event count when the left side matches late or never. Sizes stop at
//! 10K events for that reason.
#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use triggers::common::timestamp::MICROS_PER_MINUTE;
use triggers::{Duration, Event, Expr, FixedClock, Matcher};

const NAMES: [&str; 4] = ["view", "cart", "noise", "purchase"];

fn make_events(num_events: usize) -> Vec<Event> {
    (0..num_events)
        .map(|i| Event::new(NAMES[i % NAMES.len()], (i as i64) * MICROS_PER_MINUTE))
        .collect()
}

fn funnel() -> Expr {
    Expr::then(
        Expr::event("view"),
        Expr::then(
            Expr::event("cart"),
            Expr::after(Expr::event("purchase"), Duration::from_mins(1)),
        ),
    )
}

fn abandoned_cart() -> Expr {
    Expr::then(
        Expr::and(Expr::event("cart"), Expr::not(Expr::event("purchase"))),
        Expr::after(Expr::not(Expr::event("purchase")), Duration::from_hours(24)),
    )
}

fn bench_evaluate(c: &mut Criterion) {
    let matcher = Matcher::with_clock(FixedClock(0));

    for (name, expr) in [("funnel", funnel()), ("abandoned_cart", abandoned_cart())] {
        let mut group = c.benchmark_group(format!("evaluate_{name}"));
        for &n in &[100_usize, 1_000, 10_000] {
            group.throughput(Throughput::Elements(n as u64));
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                let events = make_events(n);
                b.iter(|| matcher.evaluate(black_box(&expr), black_box(&events)));
            });
        }
        group.finish();
    }
}

fn bench_evaluate_no_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_then_no_match");
    let matcher = Matcher::with_clock(FixedClock(0));
    let expr = Expr::then(Expr::event("purchase"), Expr::event("missing"));

    for &n in &[100_usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let events = make_events(n);
            b.iter(|| matcher.evaluate(black_box(&expr), black_box(&events)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_evaluate_no_match);
criterion_main!(benches);
