//! Integration tests exercising the allocation facade over both strategies.
#![allow(
    missing_docs,
    clippy::undocumented_unsafe_blocks,
    reason = "test code doesn't need the same rigor as production code"
)]

use new_zealand::nz;
use page_pool::PagePool;
use pool_allocator::{PageAllocator, Pool, PoolAllocator, StackAllocator};
use stack_pool::StackPool;

/// The same container-side logic must work against either strategy.
fn fill_and_release<P: Pool<u64>>(allocator: &mut PoolAllocator<u64, P>) {
    let mut slots = Vec::new();

    for value in 0..16_u64 {
        let slot = allocator.allocate(1);

        unsafe {
            slot.write(value);
        }

        slots.push(slot);
    }

    for (value, slot) in slots.iter().enumerate().rev() {
        unsafe {
            assert_eq!(slot.read(), value as u64);
        }
    }

    // Reverse order satisfies the stack pool's LIFO rule and is equally fine
    // for the page pool.
    for slot in slots.into_iter().rev() {
        allocator.deallocate(slot, 1);
    }
}

#[test]
fn strategies_are_interchangeable() {
    fill_and_release(&mut StackAllocator::new());
    fill_and_release(&mut PageAllocator::new());
}

#[test]
fn stack_unwinds_top_block_then_rest() {
    let mut allocator = StackAllocator::<u32>::new();

    let first = allocator.allocate(4);
    let second = allocator.allocate(8);

    // The 8-item block is the top of the stack, so it comes back fine.
    allocator.deallocate(second, 8);
    allocator.deallocate(first, 4);

    assert_eq!(allocator.pool().arena_count(), 1);
}

#[test]
#[should_panic]
fn stack_rejects_freeing_below_a_live_block() {
    let mut allocator = StackAllocator::<u32>::new();

    let first = allocator.allocate(4);
    let second = allocator.allocate(8);

    // Top-of-stack free succeeds...
    allocator.deallocate(second, 8);

    // ...but with a third allocation live above it, the 4-item block is no
    // longer the top and must be rejected.
    let _third = allocator.allocate(2);

    allocator.deallocate(first, 4);
}

#[test]
fn page_slots_release_in_any_order() {
    let mut allocator = PageAllocator::<u64>::new();

    let a = allocator.allocate(1);
    let b = allocator.allocate(1);
    let c = allocator.allocate(1);

    allocator.deallocate(a, 1);
    allocator.deallocate(c, 1);
    allocator.deallocate(b, 1);
}

#[test]
fn configured_pools_work_behind_the_facade() {
    // Tiny pools force the growth paths through the facade.
    let mut stack =
        PoolAllocator::with_pool(StackPool::<u64>::builder().arena_capacity(nz!(2)).build());
    let mut pages =
        PoolAllocator::with_pool(PagePool::<u64>::builder().page_capacity(nz!(2)).build());

    let mut blocks = Vec::new();
    for _ in 0..6 {
        blocks.push(stack.allocate(2));
    }
    assert!(stack.pool().arena_count() >= 2);

    // Only the newest arena is active; blocks in retired arenas stay put until
    // the pool is dropped.
    let top = blocks.pop().expect("six blocks were just allocated");
    stack.deallocate(top, 2);

    let mut slots = Vec::new();
    for _ in 0..6 {
        slots.push(pages.allocate(1));
    }
    assert!(pages.pool().page_count() >= 3);
    for slot in slots {
        pages.deallocate(slot, 1);
    }
}
