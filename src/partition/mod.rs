mod communicator;
mod distributed_swarm;
mod exchange;
mod layout;

pub use communicator::*;
pub use distributed_swarm::*;
pub use exchange::*;
pub use layout::*;
