//! Basic benchmarks for the `flex_vec` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use flex_vec::{FlexVec, StackMemory};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("vec_basic");

    group.bench_function("push_100_heap", |b| {
        b.iter(|| {
            let mut values = FlexVec::<u64>::new();

            for value in 0..100 {
                values.push(black_box(value));
            }

            black_box(&values);
        });
    });

    group.bench_function("push_100_stack_pool", |b| {
        b.iter(|| {
            let mut values = FlexVec::<u64, StackMemory<u64>>::new();

            for value in 0..100 {
                values.push(black_box(value));
            }

            black_box(&values);
        });
    });

    group.bench_function("iterate_1000", |b| {
        let mut values = FlexVec::<u64>::new();
        for value in 0..1000 {
            values.push(value);
        }

        b.iter(|| {
            let mut sum = 0_u64;

            for value in values.iter() {
                sum = sum.wrapping_add(*value);
            }

            black_box(sum)
        });
    });

    group.finish();
}
