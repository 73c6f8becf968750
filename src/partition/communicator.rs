//! Point-to-point messaging between the workers of a partitioned swarm.
//!
//! [`Communicator`] is the whole surface the exchange protocols need. The
//! collectives are provided in terms of `send` and `recv`, so an
//! implementation only has to move `f64` buffers between ranks.
//! [`LocalCommunicator`] runs every rank as a thread of the current process.

use std::thread;

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, trace};

use crate::partition::PartitionLayout;
use crate::utils::SwarmError;

pub trait Communicator {
    fn rank(&self) -> usize;

    fn world_size(&self) -> usize;

    /// Sends `data` to `dest`. Messages between one pair of ranks arrive in order.
    fn send(&self, dest: usize, data: &[f64]) -> Result<(), SwarmError>;

    /// Blocks until the next message from `source` arrives.
    fn recv(&self, source: usize) -> Result<Vec<f64>, SwarmError>;

    /// Replaces `data` on every rank with the contents held by `root`.
    fn broadcast(&self, root: usize, data: &mut Vec<f64>) -> Result<(), SwarmError> {
        if root >= self.world_size() {
            return Err(SwarmError::Communication(format!(
                "broadcast root {} is outside a world of {}",
                root,
                self.world_size()
            )));
        }
        if self.rank() == root {
            for dest in (0..self.world_size()).filter(|&r| r != root) {
                self.send(dest, data)?;
            }
        } else {
            *data = self.recv(root)?;
        }
        Ok(())
    }

    /// Assembles the full state from every rank's partition.
    ///
    /// Every rank receives the same `3 * layout.n()` scalars. Buffers that do
    /// not match the layout are rejected.
    fn all_gather(&self, local: &[f64], layout: &PartitionLayout) -> Result<Vec<f64>, SwarmError> {
        let rank = self.rank();
        layout.check_rank(rank)?;
        layout.check_buffer(rank, local)?;
        let peers = (0..layout.world_size()).filter(move |&r| r != rank);

        for dest in peers.clone() {
            self.send(dest, local)?;
        }

        let mut full = vec![0.0; 3 * layout.n()];
        full[layout.scalar_range(rank)].copy_from_slice(local);
        for source in peers {
            let remote = self.recv(source)?;
            layout.check_buffer(source, &remote)?;
            full[layout.scalar_range(source)].copy_from_slice(&remote);
        }
        Ok(full)
    }
}

/// In-process communicator backed by one unbounded channel per ordered pair of ranks.
///
/// Sends never block. When a peer is dropped its channels disconnect and
/// further traffic with it fails with [`SwarmError::Communication`].
pub struct LocalCommunicator {
    rank: usize,
    senders: Vec<Sender<Vec<f64>>>,
    receivers: Vec<Receiver<Vec<f64>>>,
}

impl LocalCommunicator {
    /// Creates the connected communicators of a world, indexed by rank.
    pub fn world(world_size: usize) -> Result<Vec<Self>, SwarmError> {
        if world_size == 0 {
            return Err(SwarmError::InvalidConfig("world size must be at least 1".to_string()));
        }
        let channels: Vec<Vec<(Sender<Vec<f64>>, Receiver<Vec<f64>>)>> = (0..world_size)
            .map(|_| (0..world_size).map(|_| unbounded()).collect())
            .collect();

        let world = (0..world_size)
            .map(|rank| LocalCommunicator {
                rank,
                senders: (0..world_size).map(|to| channels[rank][to].0.clone()).collect(),
                receivers: (0..world_size).map(|from| channels[from][rank].1.clone()).collect(),
            })
            .collect();
        debug!("connected a local world of {} ranks", world_size);
        Ok(world)
    }

    fn peer_error(&self, peer: usize, action: &str) -> SwarmError {
        SwarmError::Communication(format!(
            "rank {} cannot {} rank {}: peer disconnected",
            self.rank, action, peer
        ))
    }

    fn check_peer(&self, peer: usize) -> Result<(), SwarmError> {
        if peer >= self.senders.len() {
            return Err(SwarmError::Communication(format!(
                "rank {} is outside a world of {}",
                peer,
                self.senders.len()
            )));
        }
        Ok(())
    }
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.senders.len()
    }

    fn send(&self, dest: usize, data: &[f64]) -> Result<(), SwarmError> {
        self.check_peer(dest)?;
        trace!("rank {} -> {}: {} scalars", self.rank, dest, data.len());
        self.senders[dest]
            .send(data.to_vec())
            .map_err(|_| self.peer_error(dest, "send to"))
    }

    fn recv(&self, source: usize) -> Result<Vec<f64>, SwarmError> {
        self.check_peer(source)?;
        self.receivers[source]
            .recv()
            .map_err(|_| self.peer_error(source, "receive from"))
    }
}

impl std::fmt::Debug for LocalCommunicator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("LocalCommunicator")
            .field("rank", &self.rank)
            .field("world_size", &self.senders.len())
            .finish()
    }
}

/// Runs `worker` once per rank of a local world, each on its own thread.
///
/// Results come back indexed by rank. The first failing rank's error is
/// returned; a panicking rank is reported as a communication failure.
///
/// # Examples
///
/// ```
/// use rs_swarm::partition::{run_local_world, Communicator};
///
/// let ranks = run_local_world(3, |comm| {
///     let mut data = if comm.rank() == 0 { vec![1.0, 2.0] } else { Vec::new() };
///     comm.broadcast(0, &mut data)?;
///     Ok(data.iter().sum::<f64>())
/// })
/// .unwrap();
/// assert_eq!(ranks, vec![3.0, 3.0, 3.0]);
/// ```
pub fn run_local_world<R, F>(world_size: usize, worker: F) -> Result<Vec<R>, SwarmError>
where
    R: Send,
    F: Fn(LocalCommunicator) -> Result<R, SwarmError> + Sync,
{
    let world = LocalCommunicator::world(world_size)?;
    let worker = &worker;
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(world_size);
        for comm in world {
            let rank = comm.rank;
            let handle = thread::Builder::new()
                .name(format!("swarm-rank-{}", rank))
                .spawn_scoped(scope, move || worker(comm))?;
            handles.push((rank, handle));
        }
        handles
            .into_iter()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .map_err(|_| SwarmError::Communication(format!("rank {} panicked", rank)))?
            })
            .collect()
    })
}
