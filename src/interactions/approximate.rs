use rayon::prelude::*;

use crate::interactions::{check_layout, pairwise, Contribution, InteractionParams};
use crate::models::{Point, SwarmState, STRIDE};
use crate::quadtree::QuadTree;
use crate::utils::SwarmError;

/// Summed contribution of every source the tree reports for `receiver`.
pub fn receiver_velocity(
    tree: &QuadTree,
    receiver: Point,
    params: &InteractionParams,
    theta: f64,
) -> Contribution {
    let mut total = Contribution::default();
    for node in tree.query(receiver.x, receiver.y, theta) {
        total += pairwise(params, receiver, node.com_x, node.com_y, node.phase).scaled(node.mass as f64);
    }
    total
}

/// Barnes-Hut velocity field of `state`, written into `out`.
///
/// `tree` must have been built from the same coordinates as `state`,
/// otherwise a receiver is no longer recognised as its own source. Each
/// receiver writes only its own slot; the tree and the state are shared
/// read-only across rayon tasks.
///
/// # Examples
///
/// ```
/// use rs_swarm::interactions::{approximate_velocity_field, InteractionParams};
/// use rs_swarm::models::{Quad, SwarmState};
/// use rs_swarm::quadtree::QuadTree;
///
/// let state = [0.3, 0.2, 0.0, -0.7, 0.4, 1.0, 0.1, -0.9, 2.0];
/// let tree = QuadTree::from_state(SwarmState::new(&state), Quad::new(0.0, 0.0, 2.0)).unwrap();
/// let mut out = [0.0; 9];
/// approximate_velocity_field(&state, &tree, &InteractionParams::new(1.0, -0.1, 3), 0.5, &mut out, true)
///     .unwrap();
/// assert!(out.iter().all(|v| v.is_finite()));
/// ```
pub fn approximate_velocity_field(
    state: &[f64],
    tree: &QuadTree,
    params: &InteractionParams,
    theta: f64,
    out: &mut [f64],
    parallel: bool,
) -> Result<(), SwarmError> {
    check_layout(state, out)?;
    let view = SwarmState::new(state);

    let evaluate = |i: usize, slot: &mut [f64]| {
        let c = receiver_velocity(tree, view.point(i), params, theta);
        slot[0] = c.vx;
        slot[1] = c.vy;
        slot[2] = params.omega + c.vphase;
    };

    if parallel {
        out.par_chunks_mut(STRIDE)
            .enumerate()
            .for_each(|(i, slot)| evaluate(i, slot));
    } else {
        out.chunks_mut(STRIDE)
            .enumerate()
            .for_each(|(i, slot)| evaluate(i, slot));
    }
    Ok(())
}
