use criterion::{black_box, criterion_group, criterion_main, Criterion};
use register_check_core::{check, normalize, Event};

/// Build a valid linear write/read history.
/// writers: number of processes issuing the CAS chain, round-robin
/// chain_len: number of writes in the chain
fn build_history(writers: usize, chain_len: usize) -> Vec<Event<u64, u64>> {
    let mut events = Vec::new();
    let mut time = 1;
    let mut prev = 0u64;

    for i in 1..=chain_len as u64 {
        let process = (i as usize % writers) as u64;
        events.push(Event::InvokeWrite {
            time,
            process,
            write_id: i,
            prev_write_id: prev,
            value: i,
        });
        time += 1;
        events.push(Event::OkWrite {
            time,
            process,
            write_id: i,
        });
        time += 1;

        let reader = process.wrapping_add(1) % writers as u64;
        events.push(Event::InvokeRead {
            time,
            process: reader,
        });
        time += 1;
        events.push(Event::OkRead {
            time,
            process: reader,
            write_id: i,
            value: i,
        });
        time += 1;

        prev = i;
    }

    events
}

fn bench_normalize(c: &mut Criterion) {
    let history_small = build_history(2, 50);
    let history_medium = build_history(4, 500);
    let history_large = build_history(8, 5000);

    let mut group = c.benchmark_group("normalize");

    group.bench_function("small", |b| {
        b.iter(|| normalize(black_box(&history_small), black_box(2)))
    });
    group.bench_function("medium", |b| {
        b.iter(|| normalize(black_box(&history_medium), black_box(4)))
    });
    group.bench_function("large", |b| {
        b.iter(|| normalize(black_box(&history_large), black_box(8)))
    });

    group.finish();
}

fn bench_check(c: &mut Criterion) {
    let history_small = build_history(2, 50);
    let history_medium = build_history(4, 500);
    let history_large = build_history(8, 5000);

    let mut group = c.benchmark_group("check");

    group.bench_function("small", |b| {
        b.iter(|| check(black_box(&history_small), black_box(2), black_box((0, 0))))
    });
    group.bench_function("medium", |b| {
        b.iter(|| check(black_box(&history_medium), black_box(4), black_box((0, 0))))
    });
    group.bench_function("large", |b| {
        b.iter(|| check(black_box(&history_large), black_box(8), black_box((0, 0))))
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_check);
criterion_main!(benches);
