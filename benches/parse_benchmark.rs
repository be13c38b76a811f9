//! Benchmark for requisite parsing throughput

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prereq_core::batch::parse_many;
use prereq_core::{parse_prereq, DispatchConfig};
use std::sync::Arc;

/// Realistic catalog strings, from trivial to heavily nested
const SAMPLES: &[&str] = &[
    "CIS*2500",
    "CIS*1910; CIS*2500",
    "CIS*1910, CIS*2500 OR MATH*1200",
    "BIOC*2580, [1 of HK*3810, ZOO*3600]",
    "(AHSS*1210 or MDST*1040), (MDST*1050 or MDST*2080), [(MDST*1100, MDST*1200) or MDST*1080]",
    "MGMT*3320, [1 of ECON*2560, ECON*3560], (1 of FARE*3310, HTM*3120)",
    "[1 of BIOM*3200, (ZOO*3200, ZOO*3210), ZOO*3600] - Must be completed prior to taking this course.",
    "This is not valid",
];

/// A long flat list to exercise the chart on many tokens
fn long_list(len: usize) -> String {
    (0..len)
        .map(|i| format!("CIS*{}", 1000 + i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bench_samples(c: &mut Criterion) {
    c.bench_function("parse_prereq_samples", |b| {
        b.iter(|| {
            for sample in SAMPLES {
                black_box(parse_prereq(black_box(Some(*sample))));
            }
        })
    });
}

fn bench_long_list(c: &mut Criterion) {
    let text = long_list(100);
    c.bench_function("parse_prereq_100_courses", |b| {
        b.iter(|| black_box(parse_prereq(black_box(Some(text.as_str())))))
    });
}

fn bench_batch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let inputs: Vec<Option<String>> = SAMPLES
        .iter()
        .cycle()
        .take(256)
        .map(|s| Some(s.to_string()))
        .collect();
    let config = Arc::new(DispatchConfig::default());

    c.bench_function("parse_many_256", |b| {
        b.iter(|| {
            let results =
                runtime.block_on(parse_many(inputs.clone(), Arc::clone(&config)));
            black_box(results)
        })
    });
}

criterion_group!(benches, bench_samples, bench_long_list, bench_batch);
criterion_main!(benches);
