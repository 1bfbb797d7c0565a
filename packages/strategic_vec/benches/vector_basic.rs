//! Basic benchmarks for the `strategic_vec` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use criterion::{Criterion, criterion_group, criterion_main};
use strategic_vec::{Vector, erase_if};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;
const BATCH_SIZE: usize = 1000;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_basic");

    group.bench_function("build_empty", |b| {
        b.iter(|| drop(black_box(Vector::<TestItem>::new())));
    });

    group.bench_function("push_first", |b| {
        b.iter_custom(|iters| {
            let mut vectors = iter::repeat_with(Vector::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let start = Instant::now();

            for vector in &mut vectors {
                vector.push(black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    group.bench_function("push_batch_growing", |b| {
        b.iter(|| {
            let mut vector = Vector::<TestItem>::new();

            for _ in 0..BATCH_SIZE {
                vector.push(black_box(TEST_VALUE));
            }

            vector
        });
    });

    group.bench_function("push_batch_reserved", |b| {
        b.iter(|| {
            let mut vector = Vector::<TestItem>::with_capacity(BATCH_SIZE);

            for _ in 0..BATCH_SIZE {
                vector.push(black_box(TEST_VALUE));
            }

            vector
        });
    });

    group.bench_function("insert_front", |b| {
        b.iter_custom(|iters| {
            let mut vectors = iter::repeat_with(|| {
                let mut vector = Vector::<TestItem>::with_capacity(BATCH_SIZE + 1);
                vector.resize(BATCH_SIZE, TEST_VALUE);
                vector
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let start = Instant::now();

            for vector in &mut vectors {
                _ = black_box(vector.insert(0, black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    group.bench_function("clone_batch", |b| {
        let vector = Vector::from_elem(&TEST_VALUE, BATCH_SIZE);

        b.iter(|| black_box(&vector).clone());
    });

    group.bench_function("erase_if_half", |b| {
        b.iter_custom(|iters| {
            let mut vectors = iter::repeat_with(|| (0..BATCH_SIZE).collect::<Vector<TestItem>>())
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let start = Instant::now();

            for vector in &mut vectors {
                _ = black_box(erase_if(vector, |value| value % 2 == 0));
            }

            start.elapsed()
        });
    });

    group.finish();
}
