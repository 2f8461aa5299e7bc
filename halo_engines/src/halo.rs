//! One generation of a tile: halo exchange plus separable convolution.
//!
//! The 3x3 box sum is computed as a vertical `[1, 1, 1]` pass followed by a
//! horizontal one. Each pass first borrows one row (column) from each
//! neighbouring tile as a ghost, so the sum near a tile edge sees the
//! neighbour's cells. Corners need no diagonal exchange: the ghost columns
//! are cut from the neighbours' vertical sums, which already include the
//! rows above and below.

use crate::comm::{Axis, CartComm, Tag};
use crate::{rules, Grid, Result};
use tracing::trace;

/// Data travelling to the rank above (it becomes that rank's bottom ghost).
const TAG_NORTHWARD: Tag = 16;
const TAG_SOUTHWARD: Tag = 17;
const TAG_WESTWARD: Tag = 18;
const TAG_EASTWARD: Tag = 19;

/// Fills the ghost rows of `padded` from the ranks above and below.
async fn exchange_rows(mut padded: Grid, cart: &mut CartComm) -> Result<Grid> {
    let (up, down) = cart.shift(Axis::Rows, 1);
    let (h, w) = padded.shape();

    let first = padded.row(1).to_vec();
    let bottom = cart.comm().sendrecv(up, first, down, TAG_NORTHWARD, w).await?;
    padded.row_mut(h - 1).copy_from_slice(&bottom);

    let last = padded.row(h - 2).to_vec();
    let top = cart.comm().sendrecv(down, last, up, TAG_SOUTHWARD, w).await?;
    padded.row_mut(0).copy_from_slice(&top);

    trace!(rank = cart.rank(), up, down, "rows exchanged");
    Ok(padded)
}

/// Fills the ghost columns of `padded` from the ranks to the left and right.
///
/// Columns are strided in memory, so they travel as contiguous copies.
async fn exchange_cols(mut padded: Grid, cart: &mut CartComm) -> Result<Grid> {
    let (left, right) = cart.shift(Axis::Cols, 1);
    let (h, w) = padded.shape();

    let first = padded.column(1);
    let east_ghost = cart.comm().sendrecv(left, first, right, TAG_WESTWARD, h).await?;
    padded.set_column(w - 1, &east_ghost);

    let last = padded.column(w - 2);
    let west_ghost = cart.comm().sendrecv(right, last, left, TAG_EASTWARD, h).await?;
    padded.set_column(0, &west_ghost);

    trace!(rank = cart.rank(), left, right, "columns exchanged");
    Ok(padded)
}

/// Computes the next generation of `tile`.
///
/// Every rank of `cart` must call this the same number of times: the
/// exchanges pair up with the neighbours' calls and the barriers span the
/// whole process grid.
pub async fn step(tile: &Grid, cart: &mut CartComm) -> Result<Grid> {
    let snapshot = tile.clone();

    let padded = exchange_rows(snapshot.with_ghost_rows(), cart).await?;
    let vertical = padded.convolve_rows();
    cart.barrier().await;

    let padded = exchange_cols(vertical.with_ghost_cols(), cart).await?;
    let sums = padded.convolve_cols();
    let next = rules::apply_sums(tile, sums);
    cart.barrier().await;

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::World;
    use crate::ProcessGrid;

    #[tokio::test]
    async fn single_tile_matches_whole_grid_update() {
        let procs = ProcessGrid::new(1, 1).unwrap();
        let comm = World::new(1).pop().unwrap();
        let mut cart = CartComm::new(comm, procs).unwrap();

        let mut expected = Grid::random(9, 14, Some(7));
        let mut tile = expected.clone();
        for _ in 0..8 {
            tile = step(&tile, &mut cart).await.unwrap();
            expected.update();
            assert_eq!(tile, expected);
        }
    }

    #[tokio::test]
    async fn two_tiles_share_edges() {
        // a glider crossing the seam between two 4x8 tiles stacked vertically
        let procs = ProcessGrid::new(2, 1).unwrap();
        let mut whole = Grid::blank(8, 8);
        for (r, c) in [(2, 3), (3, 4), (4, 2), (4, 3), (4, 4)] {
            whole[(r, c)] = 1;
        }

        let tasks = World::new(2).into_iter().map(|comm| {
            let rank = comm.rank();
            let tile = Grid::from_cells(4, 8, whole.cells()[rank * 32..][..32].to_vec()).unwrap();
            tokio::spawn(async move {
                let mut cart = CartComm::new(comm, procs)?;
                let mut tile = tile;
                for _ in 0..4 {
                    tile = step(&tile, &mut cart).await?;
                }
                Ok::<_, crate::Error>(tile)
            })
        });
        let tiles = futures::future::try_join_all(tasks).await.unwrap();

        for _ in 0..4 {
            whole.update();
        }
        let top = tiles[0].as_ref().unwrap();
        let bottom = tiles[1].as_ref().unwrap();
        assert_eq!(top.cells(), &whole.cells()[..32]);
        assert_eq!(bottom.cells(), &whole.cells()[32..]);
        assert_eq!(top.population() + bottom.population(), 5);
    }
}
