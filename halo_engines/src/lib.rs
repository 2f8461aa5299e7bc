#![warn(clippy::all, clippy::cargo)]

pub mod comm;
pub mod config;
mod decomposition;
mod engines;
mod error;
mod grid;
pub mod halo;
pub mod rules;
mod traits;
pub mod transpose;

pub use decomposition::{Decomposition, ProcessGrid};
pub use engines::{run, DistributedEngine, SerialEngine};
pub use error::{Error, Result};
pub use grid::Grid;
pub use rules::Strategy;
pub use traits::Engine;
