#![warn(clippy::all)]

pub mod app;
pub mod cli;
mod grid_file;
mod render;
mod timing;

pub use grid_file::{format_grid, parse_grid, read_grid, write_grid, GridFileError};
pub use render::{print_grid, render};
pub use timing::Stopwatch;
