//! Integration tests exercising the vector against both memory backends.
#![allow(missing_docs, reason = "No need for API documentation in test code")]

use flex_vec::{FlexVec, PoolMemory, StackMemory};
use new_zealand::nz;
use stack_pool::StackPool;

#[test]
fn sorting_a_freshly_filled_vector() {
    let mut values = FlexVec::<i32>::new();

    values.push(777);
    values.push(228);

    values.as_mut_slice().sort_unstable();

    assert_eq!(values.as_slice(), &[228, 777]);
}

#[test]
fn stack_backed_vector_grows_in_place() {
    let mut values = FlexVec::<u64, StackMemory<u64>>::new();

    for value in 0..100 {
        values.push(value);
    }

    assert_eq!(values.len(), 100);
    assert_eq!(values.capacity(), 128);

    for (index, value) in values.iter().enumerate() {
        assert_eq!(index as u64, *value);
    }

    values.shrink_to_fit();
    assert_eq!(values.capacity(), 100);

    assert_eq!(values.pop(), Some(99));
}

#[test]
fn stack_backed_vector_on_a_configured_pool() {
    let pool = StackPool::<u32>::builder().arena_capacity(nz!(64)).build();
    let mut values = FlexVec::with_memory(PoolMemory::with_pool(pool));

    for value in 0..32_u32 {
        values.push(value);
    }

    values.as_mut_slice().sort_unstable_by(|a, b| b.cmp(a));

    assert_eq!(values.first(), Some(&31));
    assert_eq!(values.last(), Some(&0));
}

#[test]
fn cloning_a_stack_backed_vector_uses_a_fresh_pool() {
    let mut original = FlexVec::<u64, StackMemory<u64>>::new();

    for value in 0..10 {
        original.push(value);
    }

    let mut copy = original.clone();
    copy.push(10);
    *copy.get_mut(0).expect("element exists") = 42;

    assert_eq!(original.len(), 10);
    assert_eq!(original[0], 0);
    assert_eq!(copy.len(), 11);
    assert_eq!(copy[0], 42);
}

#[test]
fn both_backends_agree_on_contents() {
    let mut heap = FlexVec::<u16>::new();
    let mut pooled = FlexVec::<u16, StackMemory<u16>>::new();

    for value in [5, 3, 8, 1, 9] {
        heap.push(value);
        pooled.push(value);
    }

    heap.as_mut_slice().sort_unstable();
    pooled.as_mut_slice().sort_unstable();

    assert_eq!(heap.as_slice(), pooled.as_slice());
}
