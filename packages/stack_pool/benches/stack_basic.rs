//! Basic benchmarks for the `stack_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use new_zealand::nz;
use stack_pool::StackPool;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack_basic");

    group.bench_function("build_empty", |b| {
        b.iter(|| drop(black_box(StackPool::<u64>::new())));
    });

    group.bench_function("allocate_deallocate_one", |b| {
        let mut pool = StackPool::<u64>::new();

        b.iter(|| {
            let block = pool.get_free_arena(1).allocate(1);
            pool.find_arena(black_box(block), 1).deallocate(block);
        });
    });

    group.bench_function("fill_and_unwind_arena", |b| {
        let mut pool = StackPool::<u64>::builder().arena_capacity(nz!(256)).build();
        let mut blocks = Vec::with_capacity(256);

        b.iter(|| {
            for _ in 0..256 {
                blocks.push(pool.get_free_arena(1).allocate(1));
            }

            for block in blocks.drain(..).rev() {
                pool.find_arena(block, 1).deallocate(block);
            }
        });
    });

    group.finish();
}
