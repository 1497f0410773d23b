//! Basic benchmarks for the `bit_vec` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use bit_vec::BitVec;
use criterion::{Criterion, criterion_group, criterion_main};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("bits_basic");

    group.bench_function("push_1000", |b| {
        b.iter(|| {
            let mut bits = BitVec::new();

            for index in 0..1000 {
                bits.push(black_box(index % 2 == 0));
            }

            black_box(&bits);
        });
    });

    group.bench_function("count_ones_64k", |b| {
        let bits = BitVec::from_elem(65_536, true);

        b.iter(|| black_box(bits.count_ones()));
    });

    group.bench_function("sort_64k", |b| {
        let mut bits = BitVec::new();
        for index in 0..65_536 {
            bits.push(index % 3 == 0);
        }

        b.iter(|| {
            bits.sort();
            black_box(&bits);
        });
    });

    group.finish();
}
