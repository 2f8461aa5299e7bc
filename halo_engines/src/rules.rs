//! B3/S23 transition rule in its two equivalent forms.

use crate::Grid;
use std::str::FromStr;

/// Next state from the current state and the number of live neighbours (0..=8).
pub fn next_state(alive: u8, neighbours: u8) -> u8 {
    match (alive, neighbours) {
        (1, 2) | (1, 3) => 1,
        (0, 3) => 1,
        _ => 0,
    }
}

/// Next state from the current state and the 3x3 box sum, which counts the cell itself.
pub fn next_state_from_sum(alive: u8, sum: u8) -> u8 {
    match sum {
        3 => 1,
        4 => alive,
        _ => 0,
    }
}

/// Turns box sums into the next generation of `state`, reusing the buffer of `sums`.
pub fn apply_sums(state: &Grid, mut sums: Grid) -> Grid {
    assert_eq!(
        state.shape(),
        sums.shape(),
        "box sums must have the shape of the tile"
    );
    for (sum, &alive) in sums.cells_mut().iter_mut().zip(state.cells()) {
        *sum = next_state_from_sum(alive, *sum);
    }
    sums
}

/// How a single process counts neighbours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Eight wrapped lookups per cell.
    #[default]
    Direct,
    /// Vertical then horizontal `[1, 1, 1]` pass over periodic ghost rows and columns.
    Separable,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "separable" => Ok(Self::Separable),
            _ => Err(format!("unknown neighbour strategy {s:?}")),
        }
    }
}
