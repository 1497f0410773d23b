//! Integration tests covering whole-vector workflows.
#![allow(missing_docs, reason = "No need for API documentation in test code")]

use bit_vec::BitVec;

#[test]
fn seventy_ones_then_a_zero() {
    let mut bits = BitVec::from_elem(70, true);

    bits.push(false);

    assert_eq!(bits.len(), 71);
    assert_eq!(bits.capacity(), 128);

    // Ascending sort: the single zero lands in front of all ones.
    bits.sort();

    assert!(!bits.get(0));
    assert_eq!(bits.iter().position(|bit| bit), Some(1));
    assert_eq!(bits.count_ones(), 70);
}

#[test]
fn alternating_pattern_survives_growth_and_shrink() {
    let mut bits = BitVec::new();

    for index in 0..500 {
        bits.push(index % 2 == 0);
    }

    bits.resize(100, false);
    bits.shrink_to_fit();

    for index in 0..100 {
        assert_eq!(bits.get(index), index % 2 == 0);
    }
}

#[test]
fn cursor_agrees_with_checked_access_in_both_directions() {
    let mut bits = BitVec::new();

    for index in 0..130 {
        bits.push(index % 7 == 0);
    }

    let forward = bits.iter().collect::<Vec<_>>();
    let mut backward = bits.iter().rev().collect::<Vec<_>>();
    backward.reverse();

    assert_eq!(forward, backward);

    for (index, bit) in forward.iter().enumerate() {
        assert_eq!(bits.get(index), *bit);
    }
}
