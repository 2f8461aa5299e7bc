//! Moving between the global row-major layout and the scatter layout, in
//! which every rank's tile is one contiguous span at its displacement.

use crate::{Decomposition, Error, Grid, Result};

fn check_shape(rows: usize, cols: usize, len: usize, d: &Decomposition) -> Result<()> {
    if (rows, cols) != (d.rows(), d.cols()) || len != rows * cols {
        return Err(Error::ShapeMismatch {
            rows: d.rows(),
            cols: d.cols(),
            len,
        });
    }
    Ok(())
}

/// Lays the tiles of `grid` out one after another, ranks in row-major order.
pub fn reorganize(grid: Grid, decomposition: &Decomposition) -> Result<Vec<u8>> {
    let (rows, cols) = grid.shape();
    check_shape(rows, cols, grid.cells().len(), decomposition)?;

    let mut flat = vec![0; rows * cols];
    for rank in 0..decomposition.procs().len() {
        let (h, w) = decomposition.tile_shape(rank);
        let (r0, c0) = decomposition.tile_origin(rank);
        let span = &mut flat[decomposition.displacements()[rank]..][..h * w];
        for (dst, i) in span.chunks_exact_mut(w).zip(r0..r0 + h) {
            dst.copy_from_slice(&grid.row(i)[c0..c0 + w]);
        }
    }
    Ok(flat)
}

/// Puts contiguous per-rank spans back into global row-major order.
pub fn inverse_reorganize(flat: Vec<u8>, decomposition: &Decomposition) -> Result<Grid> {
    let (rows, cols) = (decomposition.rows(), decomposition.cols());
    check_shape(rows, cols, flat.len(), decomposition)?;

    let mut grid = Grid::blank(rows, cols);
    for rank in 0..decomposition.procs().len() {
        let (h, w) = decomposition.tile_shape(rank);
        let (r0, c0) = decomposition.tile_origin(rank);
        let span = &flat[decomposition.displacements()[rank]..][..h * w];
        for (src, i) in span.chunks_exact(w).zip(r0..r0 + h) {
            grid.row_mut(i)[c0..c0 + w].copy_from_slice(src);
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProcessGrid;

    #[test]
    fn tiles_become_contiguous() {
        let cells = (0..16).collect::<Vec<u8>>();
        let grid = Grid::from_cells(4, 4, cells).unwrap();
        let d = Decomposition::square(4, ProcessGrid::new(2, 2).unwrap()).unwrap();
        #[rustfmt::skip]
        let expected: [u8; 16] = [
            0, 1, 4, 5,
            2, 3, 6, 7,
            8, 9, 12, 13,
            10, 11, 14, 15,
        ];
        assert_eq!(reorganize(grid, &d).unwrap(), expected);
    }

    #[test]
    fn uneven_tiles_become_contiguous() {
        let cells = (0..15).collect::<Vec<u8>>();
        let grid = Grid::from_cells(3, 5, cells).unwrap();
        let d = Decomposition::new(3, 5, ProcessGrid::new(1, 2).unwrap()).unwrap();
        #[rustfmt::skip]
        let expected: [u8; 15] = [
            0, 1, 5, 6, 10, 11,
            2, 3, 4, 7, 8, 9, 12, 13, 14,
        ];
        assert_eq!(reorganize(grid, &d).unwrap(), expected);
    }

    #[test]
    fn inverse_restores_any_grid() {
        for nx in 1..=4 {
            for ny in 1..=4 {
                for (rows, cols) in [(4, 4), (9, 9), (10, 7), (13, 21)] {
                    let grid = Grid::random(rows, cols, Some((rows * cols) as u64));
                    let d = Decomposition::new(rows, cols, ProcessGrid::new(nx, ny).unwrap())
                        .unwrap();
                    let flat = reorganize(grid.clone(), &d).unwrap();
                    assert_eq!(inverse_reorganize(flat, &d).unwrap(), grid);
                }
            }
        }
    }

    #[test]
    fn shape_must_match_decomposition() {
        let d = Decomposition::square(6, ProcessGrid::new(2, 3).unwrap()).unwrap();
        assert!(reorganize(Grid::blank(6, 5), &d).is_err());
        assert!(inverse_reorganize(vec![0; 35], &d).is_err());
    }
}
