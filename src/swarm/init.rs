use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Samples `n` entities uniformly inside the unit disk with phases in `[0, 2π)`.
///
/// Positions are drawn from `[-1, 1]²` and rejected until they fall inside
/// the disk. The result uses the flat `[x, y, phase, ...]` layout.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rs_swarm::swarm::sample_initial_state;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let state = sample_initial_state(100, &mut rng);
/// assert_eq!(state.len(), 300);
/// assert!(state.chunks(3).all(|p| p[0] * p[0] + p[1] * p[1] <= 1.0));
/// ```
pub fn sample_initial_state<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    let mut state = Vec::with_capacity(3 * n);
    for _ in 0..n {
        let (x, y) = loop {
            let x: f64 = rng.gen_range(-1.0..1.0);
            let y: f64 = rng.gen_range(-1.0..1.0);
            if x * x + y * y <= 1.0 {
                break (x, y);
            }
        };
        state.push(x);
        state.push(y);
        state.push(rng.gen_range(0.0..TAU));
    }
    state
}

/// Seeded generator when `seed` is given, otherwise one drawn from entropy.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
