//! One worker of a partitioned swarm.
//!
//! Each worker owns a contiguous slice of the entities and evaluates the
//! velocity field for that slice only. The state it integrates is its local
//! partition; the rest of the swarm is obtained through the communicator on
//! every call.

use std::path::Path;

use log::{debug, info};

use crate::interactions::{
    approximate_velocity_field, partial_velocity_field, reset_velocity_field, InteractionParams,
};
use crate::models::SwarmState;
use crate::partition::{gather_state, ring_velocity_field, Communicator, PartitionLayout};
use crate::quadtree::QuadTree;
use crate::swarm::{
    bounded_positions, max_radius, min_radius, sample_initial_state, seeded_rng, FrameWriter,
    SwarmSystem, WorkerContext,
};
use crate::utils::{ExchangeProtocol, KernelKind, SwarmConfig, SwarmError};

/// Rank that samples initial conditions and writes frames.
pub const ROOT_RANK: usize = 0;

#[derive(Debug)]
pub struct DistributedSwarm<C: Communicator> {
    comm: C,
    layout: PartitionLayout,
    config: SwarmConfig,
    params: InteractionParams,
    workers: WorkerContext,
    frames: Option<FrameWriter>,
}

impl<C: Communicator> DistributedSwarm<C> {
    /// Checks `config` against the communicator and fixes this rank's partition.
    ///
    /// The ring protocol only carries exact interactions, so it is rejected
    /// together with the approximate kernel.
    pub fn new(config: SwarmConfig, comm: C, workers: WorkerContext) -> Result<Self, SwarmError> {
        config.validate()?;
        if comm.world_size() != config.world_size {
            return Err(SwarmError::InvalidConfig(format!(
                "configured for {} workers but the communicator spans {}",
                config.world_size,
                comm.world_size()
            )));
        }
        let layout = PartitionLayout::new(config.n, config.world_size)?;
        layout.check_rank(comm.rank())?;
        debug!(
            "rank {} owns entities {:?} ({:?} exchange, {:?} kernel)",
            comm.rank(),
            layout.range(comm.rank()),
            config.exchange,
            config.kernel
        );
        Ok(Self {
            params: InteractionParams::from_config(&config),
            comm,
            layout,
            config,
            workers,
            frames: None,
        })
    }

    /// Writes frames under `dir`. Only the root rank ever writes.
    pub fn with_frames<P: AsRef<Path>>(mut self, dir: P) -> Result<Self, SwarmError> {
        if self.comm.rank() == ROOT_RANK {
            self.frames = Some(FrameWriter::new(dir)?);
        }
        Ok(self)
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn layout(&self) -> &PartitionLayout {
        &self.layout
    }

    pub fn communicator(&self) -> &C {
        &self.comm
    }

    /// Full state assembled from every rank's partition. Collective.
    pub fn gather(&self, local: &[f64]) -> Result<Vec<f64>, SwarmError> {
        gather_state(&self.comm, &self.layout, local)
    }

    fn gathered_field(&self, local: &[f64], out: &mut [f64]) -> Result<(), SwarmError> {
        let full = self.gather(local)?;
        let own = self.layout.scalar_range(self.rank());
        let parallel = self.workers.is_parallel();
        let params = &self.params;

        match self.config.kernel {
            KernelKind::Exact => {
                let offset = self.layout.start(self.rank());
                reset_velocity_field(out, params.omega);
                self.workers.install(|| {
                    partial_velocity_field(local, offset, &full, 0, params, out, parallel)
                })
            }
            KernelKind::Approximate => {
                let positions = bounded_positions(&full, &self.config)?;
                let tree = QuadTree::from_state(SwarmState::new(&positions), self.config.root)?;
                let receivers = &positions[own];
                let theta = self.config.theta;
                self.workers.install(|| {
                    approximate_velocity_field(receivers, &tree, params, theta, out, parallel)
                })
            }
        }
    }
}

impl<C: Communicator> SwarmSystem for DistributedSwarm<C> {
    /// Scalars in this rank's partition.
    fn dimension(&self) -> usize {
        3 * self.layout.len(self.rank())
    }

    fn force_field(&self, _t: f64, local: &[f64], out: &mut [f64]) -> Result<(), SwarmError> {
        self.layout.check_buffer(self.rank(), local)?;
        match self.config.exchange {
            ExchangeProtocol::Gather => self.gathered_field(local, out),
            ExchangeProtocol::Ring => {
                ring_velocity_field(&self.comm, &self.layout, local, &self.params, &self.workers, out)
            }
        }
    }

    /// The root rank samples the whole swarm and broadcasts it; every rank
    /// keeps its own partition. Collective.
    fn init(&mut self, local: &mut [f64]) -> Result<(), SwarmError> {
        let mut full = if self.rank() == ROOT_RANK {
            let mut rng = seeded_rng(self.config.seed);
            sample_initial_state(self.config.n, &mut rng)
        } else {
            Vec::new()
        };
        self.comm.broadcast(ROOT_RANK, &mut full)?;
        if full.len() != self.config.dimension() {
            return Err(SwarmError::Communication(format!(
                "initial state has {} scalars, expected {}",
                full.len(),
                self.config.dimension()
            )));
        }
        let own = self.layout.scalar_range(self.rank());
        if local.len() != own.len() {
            return Err(SwarmError::InvalidConfig(format!(
                "partition buffer has {} scalars, expected {}",
                local.len(),
                own.len()
            )));
        }
        local.copy_from_slice(&full[own]);
        Ok(())
    }

    /// Gathers the swarm and lets the root rank write it. Collective.
    fn record_frame(&mut self, t: f64, local: &[f64]) -> Result<(), SwarmError> {
        let full = self.gather(local)?;
        if let Some(frames) = self.frames.as_mut() {
            let path = frames.write_frame(t, &full)?;
            info!("rank {} recorded {}", self.comm.rank(), path.display());
        }
        Ok(())
    }

    /// Radius over the entities in `state`; pass a gathered state for swarm-wide values.
    fn min_radius(&self, state: &[f64]) -> f64 {
        min_radius(state)
    }

    /// Radius over the entities in `state`; pass a gathered state for swarm-wide values.
    fn max_radius(&self, state: &[f64]) -> f64 {
        max_radius(state)
    }
}
