//! In-process message passing between ranks.

mod cart;
mod world;

pub use cart::{Axis, CartComm, Direction};
pub use world::{Communicator, Tag, World, TAG_BROADCAST, TAG_GATHER, TAG_SCATTER};
