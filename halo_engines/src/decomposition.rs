//! Splitting a global grid into per-rank tiles.
//!
//! Rows are split over `nx` process rows and columns over `ny` process
//! columns. Whatever does not divide evenly goes to the last process row
//! (column); the grid is never padded.

use crate::{Error, Result};
use std::str::FromStr;

/// Shape of the 2D arrangement of ranks. Ranks are numbered row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcessGrid {
    pub nx: usize,
    pub ny: usize,
}

impl ProcessGrid {
    pub fn new(nx: usize, ny: usize) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(Error::InvalidProcessGrid(format!(
                "{}x{} has no ranks",
                nx, ny
            )));
        }
        Ok(Self { nx, ny })
    }

    /// The most square `nx x ny == nranks` with `nx <= ny`.
    ///
    /// A prime count degenerates to `1 x nranks`.
    pub fn for_ranks(nranks: usize) -> Result<Self> {
        if nranks == 0 {
            return Err(Error::InvalidProcessGrid("zero ranks".to_string()));
        }
        let mut nx = (nranks as f64).sqrt() as usize;
        while (nx + 1) * (nx + 1) <= nranks {
            nx += 1;
        }
        while nx * nx > nranks {
            nx -= 1;
        }
        while nranks % nx != 0 {
            nx -= 1;
        }
        Ok(Self {
            nx,
            ny: nranks / nx,
        })
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn coords_of(&self, rank: usize) -> (usize, usize) {
        assert!(rank < self.len(), "rank {} of {}", rank, self.len());
        (rank / self.ny, rank % self.ny)
    }

    pub fn rank_of(&self, px: usize, py: usize) -> usize {
        assert!(px < self.nx && py < self.ny);
        px * self.ny + py
    }
}

impl std::fmt::Display for ProcessGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.nx, self.ny)
    }
}

impl FromStr for ProcessGrid {
    type Err = Error;

    /// Parses `"NXxNY"`, e.g. `"2x3"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidProcessGrid(format!("expected NXxNY, got {:?}", s));
        let (nx, ny) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
        let nx = nx.trim().parse().map_err(|_| invalid())?;
        let ny = ny.trim().parse().map_err(|_| invalid())?;
        Self::new(nx, ny)
    }
}

/// Tile shapes, send counts and displacements for one grid over one process grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decomposition {
    rows: usize,
    cols: usize,
    procs: ProcessGrid,
    full_rows: usize,
    remaining_rows: usize,
    full_cols: usize,
    remaining_cols: usize,
    send_counts: Vec<usize>,
    displacements: Vec<usize>,
}

impl Decomposition {
    /// Fails if some process row or column would own no cells.
    pub fn new(rows: usize, cols: usize, procs: ProcessGrid) -> Result<Self> {
        let ProcessGrid { nx, ny } = procs;
        if nx == 0 || ny == 0 || rows < nx || cols < ny {
            return Err(Error::InvalidDecomposition { rows, cols, nx, ny });
        }
        let mut this = Self {
            rows,
            cols,
            procs,
            full_rows: rows / nx,
            remaining_rows: rows % nx,
            full_cols: cols / ny,
            remaining_cols: cols % ny,
            send_counts: Vec::with_capacity(procs.len()),
            displacements: Vec::with_capacity(procs.len()),
        };
        let mut offset = 0;
        for i in 0..nx {
            for j in 0..ny {
                let count = this.tile_rows(i) * this.tile_cols(j);
                this.send_counts.push(count);
                this.displacements.push(offset);
                offset += count;
            }
        }
        debug_assert_eq!(offset, rows * cols);
        Ok(this)
    }

    pub fn square(grid_size: usize, procs: ProcessGrid) -> Result<Self> {
        Self::new(grid_size, grid_size, procs)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn procs(&self) -> ProcessGrid {
        self.procs
    }

    /// Rows owned by process row `px`.
    pub fn tile_rows(&self, px: usize) -> usize {
        if px + 1 == self.procs.nx {
            self.full_rows + self.remaining_rows
        } else {
            self.full_rows
        }
    }

    /// Columns owned by process column `py`.
    pub fn tile_cols(&self, py: usize) -> usize {
        if py + 1 == self.procs.ny {
            self.full_cols + self.remaining_cols
        } else {
            self.full_cols
        }
    }

    pub fn tile_shape(&self, rank: usize) -> (usize, usize) {
        let (px, py) = self.procs.coords_of(rank);
        (self.tile_rows(px), self.tile_cols(py))
    }

    /// Global `(row, col)` of the tile's top-left cell.
    pub fn tile_origin(&self, rank: usize) -> (usize, usize) {
        let (px, py) = self.procs.coords_of(rank);
        (px * self.full_rows, py * self.full_cols)
    }

    pub fn send_counts(&self) -> &[usize] {
        &self.send_counts
    }

    pub fn displacements(&self) -> &[usize] {
        &self.displacements
    }

    /// Serializes the tables for a broadcast: shape, process grid, counts, displacements.
    pub fn encode(&self) -> Vec<u8> {
        [self.rows, self.cols, self.procs.nx, self.procs.ny]
            .iter()
            .chain(&self.send_counts)
            .chain(&self.displacements)
            .flat_map(|&x| (x as u64).to_le_bytes())
            .collect()
    }

    /// Inverse of [`Decomposition::encode`]; rejects tables that disagree with their header.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() % 8 != 0 || data.len() < 32 {
            return Err(Error::MalformedTable(data.len()));
        }
        let words = data
            .chunks_exact(8)
            .map(|chunk| {
                let mut bytes = [0; 8];
                bytes.copy_from_slice(chunk);
                u64::from_le_bytes(bytes) as usize
            })
            .collect::<Vec<_>>();
        let procs = ProcessGrid::new(words[2], words[3])?;
        let this = Self::new(words[0], words[1], procs)?;
        let n = procs.len();
        if words.len() != 4 + 2 * n
            || words[4..4 + n] != this.send_counts[..]
            || words[4 + n..] != this.displacements[..]
        {
            return Err(Error::MalformedTable(data.len()));
        }
        Ok(this)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn procs(nx: usize, ny: usize) -> ProcessGrid {
        ProcessGrid::new(nx, ny).unwrap()
    }

    #[test]
    fn rank_counts_factor_squarely() {
        let cases = [
            (1, (1, 1)),
            (2, (1, 2)),
            (4, (2, 2)),
            (6, (2, 3)),
            (7, (1, 7)),
            (12, (3, 4)),
            (16, (4, 4)),
            (18, (3, 6)),
        ];
        for (n, (nx, ny)) in cases {
            assert_eq!(ProcessGrid::for_ranks(n).unwrap(), procs(nx, ny), "n={}", n);
        }
        assert!(ProcessGrid::for_ranks(0).is_err());
    }

    #[test]
    fn parse_process_grid() {
        assert_eq!("2x3".parse::<ProcessGrid>().unwrap(), procs(2, 3));
        assert_eq!("4X1".parse::<ProcessGrid>().unwrap(), procs(4, 1));
        assert!("0x3".parse::<ProcessGrid>().is_err());
        assert!("23".parse::<ProcessGrid>().is_err());
        assert_eq!(procs(3, 5).to_string(), "3x5");
    }

    #[test]
    fn rank_coordinates_are_row_major() {
        let p = procs(2, 3);
        assert_eq!(p.coords_of(0), (0, 0));
        assert_eq!(p.coords_of(2), (0, 2));
        assert_eq!(p.coords_of(4), (1, 1));
        assert_eq!(p.rank_of(1, 2), 5);
    }

    #[test]
    fn remainder_goes_to_last_row_and_column() {
        let d = Decomposition::square(10, procs(3, 4)).unwrap();
        assert_eq!((0..3).map(|i| d.tile_rows(i)).collect::<Vec<_>>(), [3, 3, 4]);
        assert_eq!((0..4).map(|j| d.tile_cols(j)).collect::<Vec<_>>(), [2, 2, 2, 4]);
        assert_eq!(d.tile_shape(11), (4, 4));
        assert_eq!(d.tile_origin(11), (6, 6));
        assert_eq!(&d.send_counts()[..4], &[6, 6, 6, 12]);
        assert_eq!(&d.displacements()[..5], &[0, 6, 12, 18, 30]);
    }

    #[test]
    fn send_counts_cover_the_grid() {
        for nx in 1..=6 {
            for ny in 1..=6 {
                for (rows, cols) in [(6, 6), (7, 11), (13, 13), (32, 9)] {
                    let d = Decomposition::new(rows, cols, procs(nx, ny)).unwrap();
                    assert_eq!(d.send_counts().iter().sum::<usize>(), rows * cols);
                    let last = d.procs().len() - 1;
                    assert_eq!(
                        d.displacements()[last] + d.send_counts()[last],
                        rows * cols
                    );
                }
            }
        }
    }

    #[test]
    fn too_many_ranks_is_rejected() {
        assert!(matches!(
            Decomposition::square(3, procs(4, 1)),
            Err(Error::InvalidDecomposition { rows: 3, nx: 4, .. })
        ));
        assert!(Decomposition::new(8, 2, procs(2, 3)).is_err());
    }

    #[test]
    fn table_survives_broadcast_encoding() {
        let d = Decomposition::new(11, 7, procs(3, 2)).unwrap();
        assert_eq!(Decomposition::decode(&d.encode()).unwrap(), d);

        let mut corrupted = d.encode();
        corrupted[4 * 8] ^= 1;
        assert!(matches!(
            Decomposition::decode(&corrupted),
            Err(Error::MalformedTable(_))
        ));
        assert!(Decomposition::decode(&[0; 12]).is_err());
    }
}
