// ABOUTME: Seeded largest-remainder apportionment of an integer total across weighted buckets
// ABOUTME: The single exactness primitive behind every macro split in the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Largest-remainder splitter
//!
//! Every bucket receives `floor(share)` or `ceil(share)` and the result sums
//! to the requested total exactly. Equal remainders are ordered by bucket
//! index rotated by the seed, so the same inputs always produce the same
//! vector while different seeds spread the extra units differently.

use std::cmp::Reverse;

/// Remainders are compared after quantization so float noise cannot reorder ties
const REMAINDER_SCALE: f64 = 1e9;

fn sanitize(weights: &[f64]) -> Vec<f64> {
    let cleaned: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    if cleaned.iter().sum::<f64>() > 0.0 {
        cleaned
    } else {
        vec![1.0; weights.len()]
    }
}

/// Position of bucket `index` in the seed-rotated tie-break order
#[must_use]
pub fn rotated_rank(index: usize, len: usize, seed: u64) -> usize {
    if len == 0 {
        return 0;
    }
    let offset = (seed % len as u64) as usize;
    (index + len - offset) % len
}

/// Split `total` across `weights` so the parts sum to `total` exactly
///
/// Negative and non-finite weights count as zero; an all-zero vector falls
/// back to uniform weights. An empty weight vector yields an empty result.
#[must_use]
pub fn split(total: u32, weights: &[f64], seed: u64) -> Vec<u32> {
    let len = weights.len();
    if len == 0 {
        return Vec::new();
    }
    let weights = sanitize(weights);
    let weight_sum: f64 = weights.iter().sum();

    let shares: Vec<f64> = weights
        .iter()
        .map(|w| f64::from(total) * w / weight_sum)
        .collect();
    let mut parts: Vec<u32> = shares.iter().map(|s| s.floor() as u32).collect();
    let remainders: Vec<u64> = shares
        .iter()
        .zip(&parts)
        .map(|(share, floor)| ((share - f64::from(*floor)) * REMAINDER_SCALE).round() as u64)
        .collect();

    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&i| (Reverse(remainders[i]), rotated_rank(i, len, seed)));

    let assigned: u32 = parts.iter().sum();
    if assigned > total {
        // Float rounding pushed a floor one unit high; take it back from the smallest remainders
        let excess = (assigned - total) as usize;
        let donors: Vec<usize> = order
            .iter()
            .rev()
            .copied()
            .filter(|&i| parts[i] > 0)
            .take(excess)
            .collect();
        for i in donors {
            parts[i] -= 1;
        }
    } else {
        let missing = (total - assigned) as usize;
        for &i in order.iter().cycle().take(missing) {
            parts[i] += 1;
        }
    }
    parts
}

/// Split `total` in units of `step`; the sub-step residue lands on exactly one bucket
///
/// The residue goes to the bucket with the largest weight (ties by rotated
/// index), so every other bucket stays a multiple of `step`.
#[must_use]
pub fn split_on_grid(total: u32, weights: &[f64], step: u32, seed: u64) -> Vec<u32> {
    let step = step.max(1);
    let mut parts: Vec<u32> = split(total / step, weights, seed)
        .into_iter()
        .map(|units| units * step)
        .collect();
    let residue = total % step;
    if residue > 0 {
        if let Some(target) = heaviest(weights, seed) {
            parts[target] += residue;
        }
    }
    parts
}

/// Index of the largest weight, ties broken by rotated index
#[must_use]
pub fn heaviest(weights: &[f64], seed: u64) -> Option<usize> {
    let len = weights.len();
    let weights = sanitize(weights);
    (0..len).min_by(|&a, &b| {
        weights[b]
            .total_cmp(&weights[a])
            .then_with(|| rotated_rank(a, len, seed).cmp(&rotated_rank(b, len, seed)))
    })
}
