//! Force-field entry point for a shared-memory swarm.
//!
//! A [`Swarm`] turns a flat state vector into its velocity field. With the
//! approximate kernel a fresh quadtree is built on every call and dropped
//! before returning; nothing is carried from one evaluation to the next.
//!
//! # Example
//!
//! ```
//! use rs_swarm::swarm::{Swarm, SwarmSystem};
//! use rs_swarm::utils::{KernelKind, SwarmConfig};
//!
//! let config = SwarmConfig::new(Some(64), Some(1.0), Some(-0.1), Some(0.5), Some(KernelKind::Approximate))
//!     .with_threads(2)
//!     .with_seed(3);
//! let mut swarm = Swarm::new(config).expect("valid configuration");
//!
//! let mut state = vec![0.0; swarm.dimension()];
//! swarm.init(&mut state).unwrap();
//!
//! let mut velocity = vec![0.0; swarm.dimension()];
//! swarm.force_field(0.0, &state, &mut velocity).unwrap();
//! assert!(velocity.iter().all(|v| v.is_finite()));
//! ```

use std::borrow::Cow;
use std::path::Path;

use log::{debug, warn};

use crate::interactions::{approximate_velocity_field, exact_velocity_field, InteractionParams};
use crate::models::{SwarmState, STRIDE};
use crate::quadtree::QuadTree;
use crate::swarm::{sample_initial_state, seeded_rng, FrameWriter, WorkerContext};
use crate::utils::{BoundaryPolicy, KernelKind, SwarmConfig, SwarmError};

/// Relative distance from the root edge at which clamped entities are placed.
const CLAMP_MARGIN: f64 = 1e-9;

/// What an integrator needs from a swarm.
///
/// `force_field` must behave as a pure function of `(t, state)`.
pub trait SwarmSystem {
    /// Number of scalars in the state this system evolves.
    fn dimension(&self) -> usize;

    /// Writes the derivative of `state` into `out`.
    fn force_field(&self, t: f64, state: &[f64], out: &mut [f64]) -> Result<(), SwarmError>;

    /// Fills `state` with initial conditions.
    fn init(&mut self, state: &mut [f64]) -> Result<(), SwarmError>;

    /// Persists a snapshot of `state` at time `t`.
    fn record_frame(&mut self, t: f64, state: &[f64]) -> Result<(), SwarmError>;

    /// Smallest distance of an entity from the swarm's mean position.
    fn min_radius(&self, state: &[f64]) -> f64;

    /// Largest distance of an entity from the swarm's mean position.
    fn max_radius(&self, state: &[f64]) -> f64;
}

/// Shared-memory swarm: one process, a pool of worker threads.
#[derive(Debug)]
pub struct Swarm {
    config: SwarmConfig,
    params: InteractionParams,
    workers: WorkerContext,
    frames: Option<FrameWriter>,
}

impl Swarm {
    /// Validates `config` and starts a worker pool of `config.threads` threads.
    pub fn new(config: SwarmConfig) -> Result<Self, SwarmError> {
        let workers = WorkerContext::new(config.threads)?;
        Self::with_workers(config, workers)
    }

    /// Uses an existing worker context instead of starting a new pool.
    pub fn with_workers(config: SwarmConfig, workers: WorkerContext) -> Result<Self, SwarmError> {
        config.validate()?;
        debug!(
            "swarm of {} entities, {:?} kernel, {} thread(s)",
            config.n,
            config.kernel,
            workers.threads()
        );
        Ok(Self {
            params: InteractionParams::from_config(&config),
            config,
            workers,
            frames: None,
        })
    }

    /// Records frames under `dir` whenever [`SwarmSystem::record_frame`] is called.
    pub fn with_frames<P: AsRef<Path>>(mut self, dir: P) -> Result<Self, SwarmError> {
        self.frames = Some(FrameWriter::new(dir)?);
        Ok(self)
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn params(&self) -> &InteractionParams {
        &self.params
    }

    pub fn workers(&self) -> &WorkerContext {
        &self.workers
    }

    /// Builds the quadtree for `state` under the configured boundary policy.
    ///
    /// Returns the tree along with the coordinates it was built from, which
    /// differ from `state` only when entities were clamped.
    pub fn build_tree<'s>(&self, state: &'s [f64]) -> Result<(QuadTree, Cow<'s, [f64]>), SwarmError> {
        let positions = bounded_positions(state, &self.config)?;
        let tree = QuadTree::from_state(SwarmState::new(&positions), self.config.root)?;
        Ok((tree, positions))
    }

    fn check_dimension(&self, len: usize, what: &str) -> Result<(), SwarmError> {
        if len != self.config.dimension() {
            return Err(SwarmError::InvalidConfig(format!(
                "{} has {} scalars, expected {}",
                what,
                len,
                self.config.dimension()
            )));
        }
        Ok(())
    }
}

impl SwarmSystem for Swarm {
    fn dimension(&self) -> usize {
        self.config.dimension()
    }

    fn force_field(&self, _t: f64, state: &[f64], out: &mut [f64]) -> Result<(), SwarmError> {
        self.check_dimension(state.len(), "state")?;
        self.check_dimension(out.len(), "output")?;
        let parallel = self.workers.is_parallel();
        match self.config.kernel {
            KernelKind::Exact => self
                .workers
                .install(|| exact_velocity_field(state, &self.params, out, parallel)),
            KernelKind::Approximate => {
                let (tree, positions) = self.build_tree(state)?;
                let theta = self.config.theta;
                self.workers.install(|| {
                    approximate_velocity_field(&positions, &tree, &self.params, theta, out, parallel)
                })
            }
        }
    }

    fn init(&mut self, state: &mut [f64]) -> Result<(), SwarmError> {
        self.check_dimension(state.len(), "state")?;
        let mut rng = seeded_rng(self.config.seed);
        state.copy_from_slice(&sample_initial_state(self.config.n, &mut rng));
        Ok(())
    }

    fn record_frame(&mut self, t: f64, state: &[f64]) -> Result<(), SwarmError> {
        match self.frames.as_mut() {
            Some(frames) => frames.write_frame(t, state).map(|_| ()),
            None => Ok(()),
        }
    }

    fn min_radius(&self, state: &[f64]) -> f64 {
        min_radius(state)
    }

    fn max_radius(&self, state: &[f64]) -> f64 {
        max_radius(state)
    }
}

/// Applies the boundary policy to the positions in `state`.
///
/// Under `Reject` the state is returned untouched and the tree build reports
/// any stray entity. Under `Clamp` entities outside the root are copied to
/// just inside it.
pub fn bounded_positions<'s>(state: &'s [f64], config: &SwarmConfig) -> Result<Cow<'s, [f64]>, SwarmError> {
    let root = config.root;
    let strays = state
        .chunks_exact(STRIDE)
        .filter(|p| !root.contains(p[0], p[1]))
        .count();
    if strays == 0 || config.boundary_policy == BoundaryPolicy::Reject {
        return Ok(Cow::Borrowed(state));
    }

    warn!("clamping {} entities back inside the root region", strays);
    let margin = root.half_size * CLAMP_MARGIN;
    let mut clamped = state.to_vec();
    for p in clamped.chunks_exact_mut(STRIDE) {
        if !root.contains(p[0], p[1]) {
            let (x, y) = root.clamp_inside(p[0], p[1], margin);
            p[0] = x;
            p[1] = y;
        }
    }
    Ok(Cow::Owned(clamped))
}

/// Mean position of all entities.
pub fn swarm_center(state: &[f64]) -> (f64, f64) {
    SwarmState::new(state).center()
}

/// Distances of every entity from the mean position.
fn radii(state: &[f64]) -> impl Iterator<Item = f64> + '_ {
    let (cx, cy) = swarm_center(state);
    SwarmState::new(state)
        .points()
        .map(move |p| p.distance_sq_to(cx, cy).sqrt())
}

pub fn min_radius(state: &[f64]) -> f64 {
    radii(state).fold(f64::INFINITY, f64::min)
}

pub fn max_radius(state: &[f64]) -> f64 {
    radii(state).fold(0.0, f64::max)
}
