use crate::cli::{Args, Mode, Source};
use crate::grid_file::{read_grid, write_grid};
use crate::render::print_grid;
use crate::timing::Stopwatch;
use anyhow::Context;
use halo_engines::{config, DistributedEngine, Engine, Grid, SerialEngine};
use tracing::{debug, info};

/// Initial field described by `source`.
pub fn load(source: &Source) -> anyhow::Result<Grid> {
    match source {
        Source::Random { size, seed } => {
            anyhow::ensure!(*size > 0, "grid size must be positive");
            Ok(Grid::random(*size, *size, Some(*seed)))
        }
        Source::File(path) => Ok(read_grid(path)?),
    }
}

/// Engine for the run: serial when the process grid is a single rank.
pub fn build_engine(args: &Args, grid: Grid) -> anyhow::Result<Box<dyn Engine>> {
    let (rows, cols) = grid.shape();
    let procs = args.process_grid(rows, cols)?;
    debug!(%procs, explicit = args.explicit_ranks(), "process grid");
    if procs.len() == 1 {
        return Ok(Box::new(SerialEngine::new(grid, args.strategy)));
    }
    let engine = DistributedEngine::new(grid, procs).with_context(|| {
        format!("--ranks/--procs asked for {procs}; use fewer ranks or omit both to fit the grid")
    })?;
    Ok(Box::new(engine))
}

/// Loads the field, evolves it and reports the final state.
pub fn run(args: &Args) -> anyhow::Result<Grid> {
    config::set_worker_threads(args.threads);
    let mut sw = Stopwatch::start();
    let grid = load(&args.source)?;
    info!(rows = grid.rows(), cols = grid.cols(), "grid loaded in {:.3} ms", sw.split());

    let mut engine = build_engine(args, grid)?;
    for line in engine.statistics().lines() {
        info!("{line}");
    }
    engine.update(args.generations)?;
    info!(
        generations = args.generations,
        population = engine.population(),
        "evolved in {:.3} ms",
        sw.split()
    );

    let grid = engine.current_state();
    match args.mode {
        Mode::Visualize => print_grid(grid),
        Mode::Save => {
            write_grid(&args.output, grid)?;
            info!("final grid written to {}", args.output.display());
        }
        Mode::Quiet => {}
    }
    Ok(grid.clone())
}
