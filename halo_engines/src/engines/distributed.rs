use crate::comm::{CartComm, Communicator, World};
use crate::transpose::{inverse_reorganize, reorganize};
use crate::{config, halo, Decomposition, Engine, Error, Grid, ProcessGrid, Result};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const ROOT: usize = 0;

/// Torus split into tiles, one per rank, evolved with halo exchanges.
///
/// Every call to [`Engine::update`] is one complete run: the root scatters
/// the tiles, all ranks step their tile in lockstep, and the root gathers
/// the result back into global order.
pub struct DistributedEngine {
    grid: Grid,
    procs: ProcessGrid,
}

impl DistributedEngine {
    /// Fails if the grid cannot be split over `procs` without empty tiles.
    pub fn new(grid: Grid, procs: ProcessGrid) -> Result<Self> {
        Decomposition::new(grid.rows(), grid.cols(), procs)?;
        Ok(Self { grid, procs })
    }

    pub fn with_ranks(grid: Grid, nranks: usize) -> Result<Self> {
        Self::new(grid, ProcessGrid::for_ranks(nranks)?)
    }

    pub fn procs(&self) -> ProcessGrid {
        self.procs
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }
}

impl Engine for DistributedEngine {
    fn current_state(&self) -> &Grid {
        &self.grid
    }

    fn update(&mut self, generations: u64) -> Result<()> {
        let threads = config::get_config().threads_for(self.procs.len());
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(threads)
            .enable_all()
            .build()?;
        debug!(procs = %self.procs, threads, "runtime started");
        self.grid = runtime.block_on(run(self.grid.clone(), self.procs, generations))?;
        Ok(())
    }

    fn statistics(&self) -> String {
        let mut s = format!("distributed over {} ranks\n", self.procs);
        if let Ok(d) = Decomposition::new(self.grid.rows(), self.grid.cols(), self.procs) {
            let (h, w) = d.tile_shape(0);
            let (h_last, w_last) = d.tile_shape(self.procs.len() - 1);
            s += &format!("tile: {}x{} (last {}x{})\n", h, w, h_last, w_last);
        }
        s
    }
}

/// Scatters `grid` over `procs`, runs `generations` steps on every rank and gathers the result.
///
/// Must be awaited inside a runtime that can run all rank tasks concurrently
/// (any tokio runtime does, since ranks only wait on messages and barriers).
/// The first failing rank fails the run and the remaining ranks are cancelled.
pub async fn run(grid: Grid, procs: ProcessGrid, generations: u64) -> Result<Grid> {
    info!(
        rows = grid.rows(),
        cols = grid.cols(),
        procs = %procs,
        generations,
        "distributed run"
    );
    let mut root_grid = Some(grid);
    let mut ranks = JoinSet::new();
    for comm in World::new(procs.len()) {
        let grid = if comm.rank() == ROOT {
            root_grid.take()
        } else {
            None
        };
        ranks.spawn(rank_main(comm, procs, grid, generations));
    }
    join_ranks(ranks).await
}

/// Waits for every rank; on the first error the others are aborted before returning.
async fn join_ranks(mut ranks: JoinSet<Result<Option<Grid>>>) -> Result<Grid> {
    let mut result = None;
    while let Some(joined) = ranks.join_next().await {
        match joined.map_err(Error::from).and_then(|r| r) {
            Ok(Some(grid)) => result = Some(grid),
            Ok(None) => {}
            Err(e) => {
                warn!(remaining = ranks.len(), "rank failed, cancelling run: {e}");
                ranks.shutdown().await;
                return Err(e);
            }
        }
    }
    result.ok_or(Error::MissingResult)
}

/// Body of one rank. Only the root holds `grid` and returns the gathered result.
async fn rank_main(
    comm: Communicator,
    procs: ProcessGrid,
    grid: Option<Grid>,
    generations: u64,
) -> Result<Option<Grid>> {
    let mut cart = CartComm::new(comm, procs)?;
    let rank = cart.rank();

    let table = match &grid {
        Some(g) => Decomposition::new(g.rows(), g.cols(), procs)?.encode(),
        None => Vec::new(),
    };
    let table = cart.comm().broadcast(ROOT, table).await?;
    let d = Decomposition::decode(&table)?;
    let (counts, displs) = (d.send_counts(), d.displacements());

    let flat = match grid {
        Some(g) => reorganize(g, &d)?,
        None => Vec::new(),
    };
    let local = cart.comm().scatterv(ROOT, &flat, counts, displs).await?;
    drop(flat);

    let (rows, cols) = d.tile_shape(rank);
    let mut tile = Grid::from_cells(rows, cols, local)?;
    debug!(rank, coords = ?cart.coords(), rows, cols, "tile received");

    for generation in 0..generations {
        tile = halo::step(&tile, &mut cart).await?;
        if rank == ROOT && generation % 64 == 63 {
            debug!(generation = generation + 1, "generations done");
        }
    }

    let gathered = cart
        .comm()
        .gatherv(ROOT, tile.into_cells(), counts, displs)
        .await?;
    gathered.map(|flat| inverse_reorganize(flat, &d)).transpose()
}
