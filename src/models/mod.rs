mod point;
mod swarm_state;

pub use point::*;
pub use swarm_state::*;
