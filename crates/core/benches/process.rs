//! Benchmarks for line processing
//!
//! Measures the steady-state cost of `process` once the templates have
//! converged, and the cost of mining a cold engine from scratch.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use drain_core::{Drain, DrainConfig};

/// Generate N synthetic log lines spread over a handful of templates
fn generate_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("User user{} logged in from 10.0.{}.{}", i, i % 256, i % 100),
            1 => format!("Connection timeout after {}ms to db-{}", i * 10, i % 8),
            2 => format!("GET /api/v1/items/{} 200 {}ms", i, i % 300),
            _ => format!("Worker {} finished job {} in {} seconds", i % 16, i, i % 60),
        })
        .collect()
}

fn engine() -> Drain {
    Drain::new(DrainConfig::new().with_similarity_threshold(0.5)).expect("valid config")
}

/// Benchmark processing against converged templates
fn bench_process_warm(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_warm");
    let lines = generate_lines(1000);

    let mut drain = engine();
    for line in &lines {
        drain.process(line);
    }

    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("1000_lines", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(drain.process(black_box(line)).cluster_id);
            }
        })
    });

    group.finish();
}

/// Benchmark mining a fresh engine
fn bench_process_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_cold");

    for size in [100, 1000, 10000] {
        let lines = generate_lines(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{}_lines", size), |b| {
            b.iter(|| {
                let mut drain = engine();
                for line in &lines {
                    drain.process(line);
                }
                black_box(drain.cluster_count())
            })
        });
    }

    group.finish();
}

/// Benchmark the read-only lookup path
fn bench_find(c: &mut Criterion) {
    let lines = generate_lines(1000);
    let mut drain = engine();
    for line in &lines {
        drain.process(line);
    }

    c.bench_function("find", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(drain.find(black_box(line)));
            }
        })
    });
}

criterion_group!(benches, bench_process_warm, bench_process_cold, bench_find);
criterion_main!(benches);
