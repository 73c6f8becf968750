// src/utils/constants_config.rs
use log::warn;

use crate::models::Quad;
use crate::utils::{errors::SwarmError, DEFAULT_SWARM_CONFIG};

/// Selects how the velocity field is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelKind {
    /// Every unordered pair, O(N²).
    Exact,
    /// Barnes-Hut quadtree aggregates, O(N log N).
    Approximate,
}

/// How workers obtain the state owned by the other partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeProtocol {
    /// Every worker gathers the full state before evaluating.
    Gather,
    /// Partitions travel around a ring, one neighbour per round.
    Ring,
}

/// What happens to an entity that drifts outside the fixed root square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Fail the force-field evaluation with `SwarmError::OutOfBounds`.
    Reject,
    /// Pull the entity just inside the root square for tree build and query.
    Clamp,
}

/// Everything the force field needs to know about a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwarmConfig {
    /// Number of entities.
    pub n: usize,
    /// Phase-dependent attraction strength.
    pub j: f64,
    /// Phase synchronisation strength.
    pub k: f64,
    /// Barnes-Hut opening threshold; smaller is more accurate.
    pub theta: f64,
    /// Natural frequency of every oscillator.
    pub omega: f64,
    /// Separation clamp used by the velocity law.
    pub min_separation: f64,
    /// Worker threads for the shared-memory kernels.
    pub threads: usize,
    /// Number of partitions in a distributed run.
    pub world_size: usize,
    pub kernel: KernelKind,
    pub exchange: ExchangeProtocol,
    pub boundary_policy: BoundaryPolicy,
    /// Fixed root region of the quadtree.
    pub root: Quad,
    /// Seed for initial conditions; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        DEFAULT_SWARM_CONFIG
    }
}

impl SwarmConfig {
    /// Builds a configuration, falling back to the defaults for every `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_swarm::utils::{KernelKind, SwarmConfig};
    ///
    /// let config = SwarmConfig::new(Some(64), None, Some(0.0), None, Some(KernelKind::Exact));
    /// assert_eq!(config.n, 64);
    /// assert_eq!(config.j, 1.0);
    /// assert_eq!(config.k, 0.0);
    /// assert_eq!(config.kernel, KernelKind::Exact);
    /// ```
    pub fn new(
        n: Option<usize>,
        j: Option<f64>,
        k: Option<f64>,
        theta: Option<f64>,
        kernel: Option<KernelKind>,
    ) -> Self {
        let default = DEFAULT_SWARM_CONFIG;
        Self {
            n: n.unwrap_or(default.n),
            j: j.unwrap_or(default.j),
            k: k.unwrap_or(default.k),
            theta: theta.unwrap_or(default.theta),
            kernel: kernel.unwrap_or(default.kernel),
            ..default
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_world_size(mut self, world_size: usize) -> Self {
        self.world_size = world_size;
        self
    }

    pub fn with_exchange(mut self, exchange: ExchangeProtocol) -> Self {
        self.exchange = exchange;
        self
    }

    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of scalars in a full state vector.
    pub fn dimension(&self) -> usize {
        3 * self.n
    }

    /// Checks every field the core relies on.
    pub fn validate(&self) -> Result<(), SwarmError> {
        if self.n == 0 {
            return Err(SwarmError::InvalidConfig("entity count must be positive".to_string()));
        }
        if !self.j.is_finite() || !self.k.is_finite() {
            return Err(SwarmError::InvalidConfig("coupling constants must be finite".to_string()));
        }
        if !(self.theta > 0.0) {
            return Err(SwarmError::InvalidConfig(format!("theta must be positive, got {}", self.theta)));
        }
        if !self.omega.is_finite() {
            return Err(SwarmError::InvalidConfig("natural frequency must be finite".to_string()));
        }
        if !(self.min_separation > 0.0) {
            return Err(SwarmError::InvalidConfig(format!(
                "minimum separation must be positive, got {}",
                self.min_separation
            )));
        }
        if self.threads == 0 {
            return Err(SwarmError::InvalidConfig("thread count must be at least 1".to_string()));
        }
        if self.world_size == 0 || self.world_size > self.n {
            return Err(SwarmError::InvalidConfig(format!(
                "world size {} must be between 1 and the entity count {}",
                self.world_size, self.n
            )));
        }
        if !(self.root.half_size > 0.0) {
            return Err(SwarmError::InvalidConfig("root region must have a positive half size".to_string()));
        }
        if self.exchange == ExchangeProtocol::Ring && self.kernel == KernelKind::Approximate {
            return Err(SwarmError::InvalidConfig(
                "ring exchange only supports the exact kernel".to_string(),
            ));
        }
        if self.n % self.world_size != 0 {
            warn!(
                "{} entities do not split evenly over {} workers; the last partition takes {} extra",
                self.n,
                self.world_size,
                self.n % self.world_size
            );
        }
        Ok(())
    }
}
