use log::trace;

use crate::interactions::{partial_velocity_field, reset_velocity_field, InteractionParams};
use crate::partition::{Communicator, PartitionLayout};
use crate::swarm::WorkerContext;
use crate::utils::SwarmError;

fn check_world<C: Communicator + ?Sized>(comm: &C, layout: &PartitionLayout) -> Result<(), SwarmError> {
    if comm.world_size() != layout.world_size() {
        return Err(SwarmError::Communication(format!(
            "communicator spans {} ranks but the layout has {}",
            comm.world_size(),
            layout.world_size()
        )));
    }
    layout.check_rank(comm.rank())
}

/// Gathers the full state on every rank. All ranks must call this together.
pub fn gather_state<C: Communicator + ?Sized>(
    comm: &C,
    layout: &PartitionLayout,
    local: &[f64],
) -> Result<Vec<f64>, SwarmError> {
    check_world(comm, layout)?;
    comm.all_gather(local, layout)
}

/// Exact velocity field of this rank's partition, passing partitions around a ring.
///
/// The own partition is accumulated first. In round `k` the local partition
/// goes to `(rank + k) mod W` while the one from `(rank - k) mod W` is
/// accumulated, so after `W - 1` rounds every foreign partition has been seen
/// exactly once. All ranks must call this together.
pub fn ring_velocity_field<C: Communicator + ?Sized>(
    comm: &C,
    layout: &PartitionLayout,
    local: &[f64],
    params: &InteractionParams,
    workers: &WorkerContext,
    out: &mut [f64],
) -> Result<(), SwarmError> {
    check_world(comm, layout)?;
    let rank = comm.rank();
    let world = layout.world_size();
    layout.check_buffer(rank, local)?;
    if out.len() != local.len() {
        return Err(SwarmError::InvalidConfig(format!(
            "partition has {} scalars but the output buffer has {}",
            local.len(),
            out.len()
        )));
    }

    let offset = layout.start(rank);
    let parallel = workers.is_parallel();
    reset_velocity_field(out, params.omega);
    workers.install(|| partial_velocity_field(local, offset, local, offset, params, out, parallel))?;

    for round in 1..world {
        let dest = (rank + round) % world;
        let source = (rank + world - round) % world;
        comm.send(dest, local)?;
        let remote = comm.recv(source)?;
        layout.check_buffer(source, &remote)?;
        trace!("rank {} round {}: accumulating partition {}", rank, round, source);
        let source_offset = layout.start(source);
        workers.install(|| {
            partial_velocity_field(local, offset, &remote, source_offset, params, out, parallel)
        })?;
    }
    Ok(())
}
