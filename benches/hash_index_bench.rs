use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use record_store::hash_index::HashIndex;
use record_store::RecordId;
use std::time::Duration;

fn id(n: usize) -> RecordId {
    RecordId::new(n as i32).expect("positive")
}

fn bench_put_sequential_100k(c: &mut Criterion) {
    c.bench_function("index::put_sequential_100k", |b| {
        b.iter_batched(
            HashIndex::new,
            |mut ix| {
                for n in 1..=100_000 {
                    ix.put(id(n), n);
                }
                black_box(ix)
            },
            BatchSize::SmallInput,
        )
    });
}

// Remove-then-put keeps tombstones cycling through recycling and
// same-capacity compaction.
fn bench_tombstone_churn(c: &mut Criterion) {
    c.bench_function("index::tombstone_churn_50k", |b| {
        b.iter_batched(
            || {
                let mut ix = HashIndex::new();
                for n in 1..=10_000 {
                    ix.put(id(n), n);
                }
                ix
            },
            |mut ix| {
                for n in 1..=50_000 {
                    ix.remove(id(n));
                    ix.put(id(n + 10_000), n);
                }
                black_box(ix)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_100k(c: &mut Criterion) {
    c.bench_function("index::get_hit_100k", |b| {
        let mut ix = HashIndex::new();
        for n in 1..=100_000 {
            ix.put(id(n), n);
        }
        b.iter(|| {
            let mut sum = 0usize;
            for n in 1..=100_000 {
                sum = sum.wrapping_add(ix.get(id(n)).unwrap_or(0));
            }
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_put_sequential_100k, bench_tombstone_churn, bench_get_hit_100k
}
criterion_main!(benches);
