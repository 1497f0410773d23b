//! A growable pool of fixed-size pages whose uniform slots are tracked by an
//! occupancy bitmap.
//!
//! This crate provides [`PagePool`], a pool that hands out single-item memory
//! slots from a list of fixed-size [`Page`] buffers. Each page subdivides its
//! buffer into uniform slots and tracks occupancy with one bit per slot, so any
//! slot can be returned independently of allocation order — the counterpart to
//! the strictly LIFO `stack_pool` crate.
//!
//! The pool grows by appending pages: when no page has a free slot left, a fresh
//! page is created. Pages are only released when the pool itself is dropped.
//!
//! # Example
//!
//! ```rust
//! use page_pool::PagePool;
//!
//! let mut pool = PagePool::<u64>::new();
//!
//! let slot = pool.get_free_page(1).allocate();
//!
//! // The slot is raw, uninitialized storage for one item.
//! unsafe {
//!     slot.write(42);
//! }
//!
//! // Slots may be returned in any order.
//! pool.find_page(slot, 1).deallocate(slot);
//! ```
//!
//! # Safety model
//!
//! The pool deals in raw, uninitialized memory. Callers are responsible for
//! initializing storage before reading it and for not using pointers after the
//! owning slot was deallocated or the pool was dropped. The pool itself never
//! reads or writes slot bytes, only its bitmap.

mod builder;
mod page;
mod pool;

pub use builder::PagePoolBuilder;
pub use page::Page;
pub use pool::PagePool;
