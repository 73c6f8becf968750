use crate::models::Quad;
use crate::utils;

/// Natural frequency shared by every oscillator.
pub const NATURAL_FREQUENCY: f64 = 0.1;

/// Separations below this are clamped before entering the velocity law.
pub const MIN_SEPARATION: f64 = 1e-6;

/// Subdivision limit for the quadtree; coincident points hit this instead of recursing forever.
pub const MAX_TREE_DEPTH: usize = 48;

/// Sine/cosine sums below this magnitude are treated as a cancelled circular mean.
pub const CIRCULAR_MEAN_EPSILON: f64 = 1e-15;

/// Square of half size 2 centered at the origin.
pub const DEFAULT_ROOT: Quad = Quad { cx: 0.0, cy: 0.0, half_size: 2.0 };

pub const DEFAULT_SWARM_CONFIG: utils::SwarmConfig = utils::SwarmConfig {
    n: 512,
    j: 1.0,
    k: -0.1,
    theta: 0.5,
    omega: NATURAL_FREQUENCY,
    min_separation: MIN_SEPARATION,
    threads: 1,
    world_size: 1,
    kernel: utils::KernelKind::Approximate,
    exchange: utils::ExchangeProtocol::Gather,
    boundary_policy: utils::BoundaryPolicy::Reject,
    root: DEFAULT_ROOT,
    seed: None,
};
