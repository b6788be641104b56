//! Random stream helpers.
//!
//! Every partitioning call draws from its own [`StdRng`], so two partitioners
//! running in the same process never share a stream.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a reproducible random stream from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a stream from `seed`, or from fresh entropy when `None`.
pub fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// Draws `k` distinct customer indices from `1..=customers` (the depot, index 0,
/// is never drawn). Order is the draw order.
///
/// # Panics
///
/// Panics if `k > customers`; callers validate the group count first, so this
/// is an invariant violation.
pub fn distinct_customers<R: Rng + ?Sized>(rng: &mut R, customers: usize, k: usize) -> Vec<usize> {
    assert!(
        k <= customers,
        "cannot draw {k} distinct customers out of {customers}"
    );
    rand::seq::index::sample(rng, customers, k)
        .into_iter()
        .map(|i| i + 1)
        .collect()
}

/// Draws a customer index from `1..=customers` that is not in `taken`.
///
/// Returns `None` when every customer is already taken.
pub fn customer_outside<R, F>(rng: &mut R, customers: usize, taken_len: usize, taken: F) -> Option<usize>
where
    R: Rng + ?Sized,
    F: Fn(usize) -> bool,
{
    // Rejection sampling only while at least half of the range is free.
    if taken_len * 2 <= customers {
        loop {
            let candidate = rng.random_range(1..=customers);
            if !taken(candidate) {
                return Some(candidate);
            }
        }
    }
    let free: Vec<usize> = (1..=customers).filter(|&c| !taken(c)).collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.random_range(0..free.len())])
    }
}
