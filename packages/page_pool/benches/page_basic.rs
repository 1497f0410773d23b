//! Basic benchmarks for the `page_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use new_zealand::nz;
use page_pool::PagePool;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_basic");

    group.bench_function("build_empty", |b| {
        b.iter(|| drop(black_box(PagePool::<u64>::new())));
    });

    group.bench_function("allocate_deallocate_one", |b| {
        let mut pool = PagePool::<u64>::new();

        b.iter(|| {
            let slot = pool.get_free_page(1).allocate();
            pool.find_page(black_box(slot), 1).deallocate(slot);
        });
    });

    group.bench_function("churn_half_full_page", |b| {
        // Allocation from a half-occupied page stresses the bitmap scan.
        let mut pool = PagePool::<u64>::builder().page_capacity(nz!(512)).build();

        let slots = (0..256)
            .map(|_| pool.get_free_page(1).allocate())
            .collect::<Vec<_>>();

        b.iter(|| {
            let slot = pool.get_free_page(1).allocate();
            pool.find_page(black_box(slot), 1).deallocate(slot);
        });

        for slot in slots {
            pool.find_page(slot, 1).deallocate(slot);
        }
    });

    group.finish();
}
