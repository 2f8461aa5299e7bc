mod distributed;
mod serial;

pub use distributed::{run, DistributedEngine};
pub use serial::SerialEngine;
