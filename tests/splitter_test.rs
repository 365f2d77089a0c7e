// ABOUTME: Property tests for the seeded largest-remainder splitter
// ABOUTME: Randomized weights from a fixed ChaCha stream check exact sums, floor/ceil bounds, and determinism
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use macroplan::engine::splitter::{heaviest, split, split_on_grid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CASES: usize = 500;

fn random_case(rng: &mut ChaCha8Rng) -> (u32, Vec<f64>, u64) {
    let len = rng.gen_range(1..=8);
    let weights = (0..len).map(|_| rng.gen_range(0.1..5.0)).collect();
    (rng.gen_range(0..2000), weights, rng.gen())
}

// === Exactness ===

#[test]
fn test_parts_sum_to_total() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..CASES {
        let (total, weights, seed) = random_case(&mut rng);
        let parts = split(total, &weights, seed);
        assert_eq!(parts.len(), weights.len());
        assert_eq!(parts.iter().sum::<u32>(), total, "{weights:?} seed {seed}");
    }
}

#[test]
fn test_parts_stay_within_floor_and_ceil() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..CASES {
        let (total, weights, seed) = random_case(&mut rng);
        let weight_sum: f64 = weights.iter().sum();
        for (part, weight) in split(total, &weights, seed).iter().zip(&weights) {
            let share = f64::from(total) * weight / weight_sum;
            assert!(
                (f64::from(*part) - share).abs() < 1.0 + 1e-9,
                "part {part} share {share}"
            );
        }
    }
}

#[test]
fn test_grid_split_leaves_one_residue() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    for _ in 0..CASES {
        let (total, weights, seed) = random_case(&mut rng);
        let parts = split_on_grid(total, &weights, 5, seed);
        assert_eq!(parts.iter().sum::<u32>(), total);
        let off_grid = parts.iter().filter(|p| *p % 5 != 0).count();
        assert!(off_grid <= 1, "{parts:?}");
        if total % 5 == 0 {
            assert_eq!(off_grid, 0);
        }
    }
}

// === Determinism and Ties ===

#[test]
fn test_same_seed_same_split() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    for _ in 0..CASES {
        let (total, weights, seed) = random_case(&mut rng);
        assert_eq!(split(total, &weights, seed), split(total, &weights, seed));
    }
}

#[test]
fn test_seed_rotates_equal_remainders() {
    let weights = [1.0, 1.0, 1.0];
    assert_eq!(split(2, &weights, 0), vec![1, 1, 0]);
    assert_eq!(split(2, &weights, 1), vec![0, 1, 1]);
    assert_eq!(split(2, &weights, 2), vec![1, 0, 1]);
    assert_eq!(split(2, &weights, 3), split(2, &weights, 0));
}

#[test]
fn test_larger_remainder_wins_regardless_of_seed() {
    // shares 1.2 and 0.8: the second bucket has the larger remainder
    for seed in 0..10 {
        assert_eq!(split(2, &[3.0, 2.0], seed), vec![1, 1]);
    }
}

#[test]
fn test_heaviest_breaks_ties_by_rotation() {
    assert_eq!(heaviest(&[1.0, 2.0, 2.0], 0), Some(1));
    assert_eq!(heaviest(&[1.0, 2.0, 2.0], 2), Some(2));
    assert_eq!(heaviest(&[], 0), None);
}

// === Degenerate Weights ===

#[test]
fn test_degenerate_weights() {
    assert!(split(10, &[], 0).is_empty());
    assert_eq!(split(10, &[0.0, 0.0], 0), vec![5, 5]);
    assert_eq!(split(10, &[-1.0, 1.0], 0), vec![0, 10]);
    assert_eq!(split(10, &[f64::NAN, 1.0], 0), vec![0, 10]);
    assert_eq!(split(0, &[1.0, 2.0], 4), vec![0, 0]);
}
