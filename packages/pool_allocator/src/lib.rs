//! A uniform allocate/deallocate/reallocate facade over interchangeable pool
//! strategies.
//!
//! This crate provides [`PoolAllocator`], a thin wrapper that gives the
//! LIFO `stack_pool` and the bitmap-tracked `page_pool` a single allocation
//! contract. A container parameterized over a [`Pool`] implementation can swap
//! one strategy for the other by changing a type parameter; its growth logic
//! does not change.
//!
//! The facade dispatches every call through the pool's two lookups: selecting a
//! unit with room ([`Pool::free_entry()`]) for allocations and locating the
//! owning unit by address-range containment ([`Pool::find_entry()`]) for
//! releases and resizes.
//!
//! # Example
//!
//! ```rust
//! use pool_allocator::{PageAllocator, StackAllocator};
//!
//! let mut stack = StackAllocator::<u64>::new();
//! let block = stack.allocate(4);
//! stack.deallocate(block, 4);
//!
//! // Same contract, different bookkeeping underneath.
//! let mut pages = PageAllocator::<u64>::new();
//! let slot = pages.allocate(1);
//! pages.deallocate(slot, 1);
//! ```

mod allocator;
mod pool;

pub use allocator::{PageAllocator, PoolAllocator, StackAllocator};
pub use pool::{Pool, PoolEntry};
