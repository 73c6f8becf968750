use std::f64::consts::TAU;

use crate::utils::CIRCULAR_MEAN_EPSILON;

/// `atan2` with a fixed answer for the cancelled case.
///
/// When both arguments are below [`CIRCULAR_MEAN_EPSILON`] in magnitude the
/// mean direction is undefined; `0.0` is returned.
#[inline]
pub fn circular_atan2(sin_sum: f64, cos_sum: f64) -> f64 {
    if sin_sum.abs() < CIRCULAR_MEAN_EPSILON && cos_sum.abs() < CIRCULAR_MEAN_EPSILON {
        return 0.0;
    }
    sin_sum.atan2(cos_sum)
}

/// Circular mean of an aggregate phase carrying weight `mass` and one new phase.
///
/// # Examples
///
/// ```
/// use rs_swarm::utils::merge_phase;
///
/// // Two equal weights at 0 and 1 radian average to 0.5.
/// let merged = merge_phase(1, 0.0, 1.0);
/// assert!((merged - 0.5).abs() < 1e-12);
///
/// // Antipodal phases cancel and fall back to zero.
/// assert_eq!(merge_phase(1, 0.0, std::f64::consts::PI), 0.0);
/// ```
#[inline]
pub fn merge_phase(mass: usize, phase: f64, new_phase: f64) -> f64 {
    let m = mass as f64;
    let m_new = m + 1.0;
    circular_atan2(
        (m * phase.sin() + new_phase.sin()) / m_new,
        (m * phase.cos() + new_phase.cos()) / m_new,
    )
}

/// Running weighted mean of an aggregate coordinate and one new sample.
#[inline]
pub fn merge_linear(mass: usize, value: f64, new_value: f64) -> f64 {
    let m = mass as f64;
    (m * value + new_value) / (m + 1.0)
}

/// Wraps an angle into `[0, 2π)`.
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Euclidean norm of the difference of two equally sized vectors.
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
