//! A growable pool of fixed-size arenas with bump allocation and strict LIFO frees.
//!
//! This crate provides [`StackPool`], a pool that hands out raw memory blocks from a
//! list of fixed-size [`Arena`] buffers. Each arena is a bump allocator: blocks are
//! carved off a write cursor in allocation order, with a small header recorded in
//! front of every payload. Only the most recently allocated block of an arena may be
//! deallocated or resized; violating that order is a contract violation and panics.
//!
//! The pool grows by appending arenas. When the active arena cannot satisfy a
//! request, a fresh arena is created and becomes the active one. Arenas are only
//! released when the pool itself is dropped.
//!
//! # Example
//!
//! ```rust
//! use stack_pool::StackPool;
//!
//! let mut pool = StackPool::<u64>::new();
//!
//! let arena = pool.get_free_arena(4);
//! let block = arena.allocate(4);
//!
//! // The block is raw, uninitialized storage for 4 items.
//! unsafe {
//!     block.write(42);
//! }
//!
//! // The most recent allocation may be returned; earlier ones may not.
//! pool.find_arena(block, 4).deallocate(block);
//! ```
//!
//! # Safety model
//!
//! The pool deals in raw, uninitialized memory. Callers are responsible for
//! initializing storage before reading it and for not using pointers after the
//! owning block was deallocated or the pool was dropped. The pool itself never
//! reads or writes payload bytes, only its own headers.

mod arena;
mod builder;
mod pool;

pub use arena::Arena;
pub use builder::StackPoolBuilder;
pub use pool::StackPool;
