use super::Communicator;
use crate::{Error, ProcessGrid, Result};

/// Axis of the process grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Along process rows (north/south).
    Rows,
    /// Along process columns (west/east).
    Cols,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// `(d_row, d_col)` in process coordinates.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (-1, 1),
            Direction::SouthWest => (1, -1),
            Direction::SouthEast => (1, 1),
        }
    }
}

/// A communicator arranged as a periodic 2D process grid.
///
/// Every rank has a neighbour in every direction; on an axis of length one
/// that neighbour is the rank itself.
pub struct CartComm {
    comm: Communicator,
    procs: ProcessGrid,
    coords: (usize, usize),
}

impl CartComm {
    pub fn new(comm: Communicator, procs: ProcessGrid) -> Result<Self> {
        if procs.len() != comm.size() {
            return Err(Error::InvalidProcessGrid(format!(
                "{} does not hold {} ranks",
                procs,
                comm.size()
            )));
        }
        let coords = procs.coords_of(comm.rank());
        Ok(Self {
            comm,
            procs,
            coords,
        })
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn coords(&self) -> (usize, usize) {
        self.coords
    }

    pub fn procs(&self) -> ProcessGrid {
        self.procs
    }

    pub fn comm(&mut self) -> &mut Communicator {
        &mut self.comm
    }

    /// Rank at `coords + (d_row, d_col)`, wrapping around both axes.
    pub fn rank_at(&self, d_row: isize, d_col: isize) -> usize {
        let wrap = |x: usize, d: isize, n: usize| (x as isize + d).rem_euclid(n as isize) as usize;
        let px = wrap(self.coords.0, d_row, self.procs.nx);
        let py = wrap(self.coords.1, d_col, self.procs.ny);
        self.procs.rank_of(px, py)
    }

    /// `(source, dest)` for a shift by `disp` along `axis`.
    pub fn shift(&self, axis: Axis, disp: isize) -> (usize, usize) {
        match axis {
            Axis::Rows => (self.rank_at(-disp, 0), self.rank_at(disp, 0)),
            Axis::Cols => (self.rank_at(0, -disp), self.rank_at(0, disp)),
        }
    }

    pub fn neighbour(&self, direction: Direction) -> usize {
        let (d_row, d_col) = direction.offset();
        self.rank_at(d_row, d_col)
    }

    pub fn neighbours(&self) -> [(Direction, usize); 8] {
        Direction::ALL.map(|d| (d, self.neighbour(d)))
    }

    pub async fn barrier(&self) {
        self.comm.barrier().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::World;

    fn cart(nx: usize, ny: usize, rank: usize) -> CartComm {
        let procs = ProcessGrid::new(nx, ny).unwrap();
        let comm = World::new(procs.len()).swap_remove(rank);
        CartComm::new(comm, procs).unwrap()
    }

    #[test]
    fn shifts_wrap_around() {
        // 3x4 grid, rank 0 sits at (0, 0)
        let c = cart(3, 4, 0);
        assert_eq!(c.shift(Axis::Rows, 1), (8, 4));
        assert_eq!(c.shift(Axis::Cols, 1), (3, 1));

        // rank 11 sits at (2, 3)
        let c = cart(3, 4, 11);
        assert_eq!(c.coords(), (2, 3));
        assert_eq!(c.shift(Axis::Rows, 1), (7, 3));
        assert_eq!(c.shift(Axis::Cols, 1), (10, 8));
    }

    #[test]
    fn diagonal_neighbours() {
        let c = cart(3, 4, 0);
        assert_eq!(c.neighbour(Direction::NorthWest), 11);
        assert_eq!(c.neighbour(Direction::NorthEast), 9);
        assert_eq!(c.neighbour(Direction::SouthWest), 7);
        assert_eq!(c.neighbour(Direction::SouthEast), 5);
        assert_eq!(c.neighbours().len(), 8);
    }

    #[test]
    fn single_rank_axis_is_its_own_neighbour() {
        let c = cart(1, 3, 1);
        assert_eq!(c.shift(Axis::Rows, 1), (1, 1));
        assert_eq!(c.shift(Axis::Cols, 1), (0, 2));
    }

    #[test]
    fn size_must_match_process_grid() {
        let comm = World::new(5).swap_remove(0);
        assert!(CartComm::new(comm, ProcessGrid::new(2, 3).unwrap()).is_err());
    }
}
