use abuse_guard::{
    sanitize_input, ActorId, MessageFingerprint, PolicyTable, RateLimit, SecurityGate,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Benchmark fingerprint computation speed
fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    group.bench_function("short_lowercase", |b| {
        b.iter(|| MessageFingerprint::of(black_box(Some("coffee 25000"))))
    });

    group.bench_function("short_mixed_case", |b| {
        b.iter(|| MessageFingerprint::of(black_box(Some("  Coffee 25000 Lunch  "))))
    });

    let long = "Lorem ipsum dolor sit amet ".repeat(20);
    group.bench_function("long_text", |b| {
        b.iter(|| MessageFingerprint::of(black_box(Some(long.as_str()))))
    });

    group.finish();
}

/// Benchmark the full admission path for a single actor
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(1));

    // Limits high enough that nothing is rejected while measuring
    let generous = PolicyTable::default()
        .with_global(RateLimit::new(usize::MAX, Duration::from_secs(60)).unwrap())
        .with_action("bench", RateLimit::new(1_000_000, Duration::from_millis(10)).unwrap());

    group.bench_function("anonymous", |b| {
        let gate = SecurityGate::builder().build().unwrap();
        b.iter(|| gate.evaluate(black_box(None), Some("bench"), None))
    });

    group.bench_function("blocked_actor", |b| {
        let gate = SecurityGate::builder().build().unwrap();
        gate.block_actor(ActorId::new(1), Duration::from_secs(3600));
        b.iter(|| gate.evaluate(black_box(Some(ActorId::new(1))), Some("bench"), None))
    });

    group.bench_function("action_only", |b| {
        let gate = SecurityGate::builder()
            .with_policies(generous.clone())
            .build()
            .unwrap();
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            gate.evaluate(black_box(Some(ActorId::new(i % 1000))), Some("bench"), None)
        })
    });

    group.bench_function("action_and_text", |b| {
        let gate = SecurityGate::builder()
            .with_policies(generous.clone())
            .build()
            .unwrap();
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            gate.evaluate(
                black_box(Some(ActorId::new(i % 1000))),
                Some("bench"),
                Some("lunch 25000"),
            )
        })
    });

    group.finish();
}

/// Benchmark contention across threads
fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_evaluate");

    for threads in [2, 4, 8] {
        group.throughput(Throughput::Elements(threads as u64 * 1000));
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |b, &threads| {
                let gate = Arc::new(SecurityGate::builder().build().unwrap());
                b.iter(|| {
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let gate = Arc::clone(&gate);
                            thread::spawn(move || {
                                for i in 0..1000 {
                                    let actor = ActorId::new((t * 1000 + i) as i64);
                                    black_box(gate.evaluate(Some(actor), Some("history"), None));
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

/// Benchmark input sanitization
fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");

    group.bench_function("plain", |b| {
        b.iter(|| sanitize_input(black_box("coffee 25000 with friends")))
    });

    let tagged = "<b>bold</b> <script>alert(1)</script> text ".repeat(10);
    group.bench_function("tagged", |b| b.iter(|| sanitize_input(black_box(&tagged))));

    group.finish();
}

criterion_group!(
    benches,
    bench_fingerprint,
    bench_evaluate,
    bench_concurrent,
    bench_sanitize
);
criterion_main!(benches);
