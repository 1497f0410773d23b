//! A dynamic boolean array packing one logical bit per element into machine
//! words.
//!
//! This crate provides [`BitVec`], a growable sequence of bits stored in `u64`
//! words. Element access goes through bit references — a pairing of the owning
//! word and a shift — so no boolean array is ever materialized: reads extract
//! the bit, writes OR or AND-NOT a shifted mask into the word.
//!
//! Capacity is always a whole number of words (64 bits each) and growth
//! follows the usual doubling policy, measured in bits.
//!
//! # Example
//!
//! ```rust
//! use bit_vec::BitVec;
//!
//! // Whole-word initialization: 70 one-bits across two words.
//! let mut bits = BitVec::from_elem(70, true);
//! assert_eq!(bits.capacity(), 128);
//!
//! bits.push(false);
//! assert_eq!(bits.len(), 71);
//!
//! // Ascending sort moves the single zero to the front.
//! bits.sort();
//! assert!(!bits.get(0));
//! assert_eq!(bits.iter().position(|bit| bit), Some(1));
//! ```

mod cursor;
mod refs;
mod vec;

pub use cursor::Bits;
pub use refs::{BitMut, BitRef};
pub use vec::BitVec;

/// Bits per backing word.
pub(crate) const WORD_BITS: usize = u64::BITS as usize;
