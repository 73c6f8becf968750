mod approximate;
mod exact;
mod kernel;

pub use approximate::*;
pub use exact::*;
pub use kernel::*;
