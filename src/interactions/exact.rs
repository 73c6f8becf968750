//! All-pairs evaluation of the swarm velocity field.
//!
//! Each unordered pair is evaluated once and applied with opposite sign to
//! both entities. Several receivers therefore write into the same target
//! slots; the parallel path gives every rayon task a private accumulator and
//! merges them with an associative add, so no slot is ever written
//! concurrently.

use rayon::prelude::*;

use crate::interactions::{check_layout, pairwise, reset_velocity_field, InteractionParams};
use crate::models::{SwarmState, STRIDE};
use crate::utils::SwarmError;

/// Exact O(N²) velocity field of `state`, written into `out`.
///
/// # Examples
///
/// ```
/// use rs_swarm::interactions::{exact_velocity_field, InteractionParams};
///
/// let state = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0];
/// let mut out = [0.0; 6];
/// exact_velocity_field(&state, &InteractionParams::new(0.0, 0.0, 2), &mut out, false).unwrap();
///
/// // The two entities pull on each other with equal and opposite velocity.
/// assert!(out[0] > 0.0);
/// assert_eq!(out[0], -out[3]);
/// ```
pub fn exact_velocity_field(
    state: &[f64],
    params: &InteractionParams,
    out: &mut [f64],
    parallel: bool,
) -> Result<(), SwarmError> {
    check_layout(state, out)?;
    reset_velocity_field(out, params.omega);
    let view = SwarmState::new(state);
    let n = view.len();

    if !parallel {
        for i in 0..n {
            accumulate_row(&view, params, i, out);
        }
        return Ok(());
    }

    let len = out.len();
    let totals = (0..n)
        .into_par_iter()
        .fold(
            || vec![0.0; len],
            |mut acc, i| {
                accumulate_row(&view, params, i, &mut acc);
                acc
            },
        )
        .reduce(
            || vec![0.0; len],
            |mut a, b| {
                a.iter_mut().zip(b.iter()).for_each(|(x, y)| *x += y);
                a
            },
        );

    out.iter_mut().zip(totals.iter()).for_each(|(o, t)| *o += t);
    Ok(())
}

/// Applies every pair `(i, j)` with `j < i` to both sides.
#[inline]
fn accumulate_row(view: &SwarmState<'_>, params: &InteractionParams, i: usize, acc: &mut [f64]) {
    let pi = view.point(i);
    let (xi, yi, ti) = (STRIDE * i, STRIDE * i + 1, STRIDE * i + 2);
    for j in 0..i {
        let pj = view.point(j);
        let c = pairwise(params, pi, pj.x, pj.y, pj.phase);
        let (xj, yj, tj) = (STRIDE * j, STRIDE * j + 1, STRIDE * j + 2);
        acc[xi] += c.vx;
        acc[yi] += c.vy;
        acc[ti] += c.vphase;
        acc[xj] -= c.vx;
        acc[yj] -= c.vy;
        acc[tj] -= c.vphase;
    }
}

/// Adds the effect of a block of sources onto a block of receivers.
///
/// `receiver_offset` and `source_offset` are the global entity indices of
/// the first entity of each block; pairs with equal global index are
/// skipped. Only the receivers' slots in `out` are written, so this is the
/// building block for partitioned evaluation. `out` is not reset.
pub fn partial_velocity_field(
    receivers: &[f64],
    receiver_offset: usize,
    sources: &[f64],
    source_offset: usize,
    params: &InteractionParams,
    out: &mut [f64],
    parallel: bool,
) -> Result<(), SwarmError> {
    check_layout(receivers, out)?;
    let receiver_view = SwarmState::new(receivers);
    let source_view = SwarmState::new(sources);

    let apply = |local: usize, slot: &mut [f64]| {
        let global = receiver_offset + local;
        let p = receiver_view.point(local);
        for (k, s) in source_view.points().enumerate() {
            if source_offset + k == global {
                continue;
            }
            let c = pairwise(params, p, s.x, s.y, s.phase);
            slot[0] += c.vx;
            slot[1] += c.vy;
            slot[2] += c.vphase;
        }
    };

    if parallel {
        out.par_chunks_mut(STRIDE)
            .enumerate()
            .for_each(|(local, slot)| apply(local, slot));
    } else {
        out.chunks_mut(STRIDE)
            .enumerate()
            .for_each(|(local, slot)| apply(local, slot));
    }
    Ok(())
}
