mod init;
mod output;
#[allow(clippy::module_inception)]
mod swarm;
mod workers;

pub use init::*;
pub use output::*;
pub use swarm::*;
pub use workers::*;

#[cfg(test)]
mod swarm_tests;
