//! A dynamic array generic over its raw-memory backend.
//!
//! This crate provides [`FlexVec`], a growable array that owns raw,
//! uninitialized storage through a pluggable [`Memory`] backend and constructs
//! and destroys its elements explicitly. Two backends are included:
//!
//! * [`HeapMemory`] (the default) owns a plain heap buffer and reallocates by
//!   moving the live elements into a fresh buffer.
//! * [`PoolMemory`] delegates to a `pool_allocator` strategy; with a stack pool
//!   behind it ([`StackMemory`]), growth resizes the allocation in place.
//!
//! Because the backend hands back uninitialized storage, the vector — not the
//! backend — tracks which elements are live and runs their destructors.
//!
//! # Example
//!
//! ```rust
//! use flex_vec::FlexVec;
//!
//! let mut values = FlexVec::<i32>::new();
//!
//! values.push(777);
//! values.push(228);
//!
//! values.as_mut_slice().sort_unstable();
//!
//! assert_eq!(values.as_slice(), &[228, 777]);
//! ```
//!
//! # Growth policy
//!
//! The first allocation reserves 8 slots; every overflow at least doubles the
//! capacity, so the total copying work stays proportional to the final size.

mod cursor;
mod memory;
mod vec;

pub use cursor::{Cursor, CursorMut};
pub use memory::{HeapMemory, Memory, PoolMemory, StackMemory};
pub use vec::FlexVec;
