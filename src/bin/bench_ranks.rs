//! Rank scaling: `bench_ranks [SIZE] [GENERATIONS] [MAX_RANKS]`.

use halo_engines::{DistributedEngine, Engine, Grid, SerialEngine, Strategy};
use torus_life::Stopwatch;

fn arg(i: usize, default: usize) -> usize {
    std::env::args()
        .nth(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() -> anyhow::Result<()> {
    let size = arg(1, 1024);
    let generations = arg(2, 100) as u64;
    let max_ranks = arg(3, 16);
    let grid = Grid::random(size, size, Some(42));

    let mut sw = Stopwatch::start();
    let mut serial = SerialEngine::new(grid.clone(), Strategy::Direct);
    serial.update(generations)?;
    let base = sw.split();
    println!("{size}x{size}, {generations} generations");
    println!("serial: {base:.1} ms");

    let mut ranks = 1;
    while ranks <= max_ranks {
        let mut engine = match DistributedEngine::with_ranks(grid.clone(), ranks) {
            Ok(engine) => engine,
            Err(e) => {
                println!("{ranks:>4} ranks: {e}");
                break;
            }
        };
        sw.split();
        engine.update(generations)?;
        let ms = sw.split();
        anyhow::ensure!(
            engine.current_state() == serial.current_state(),
            "{} ranks diverged from the serial run",
            engine.procs()
        );
        println!(
            "{ranks:>4} ranks ({}): {ms:.1} ms, speedup {:.2}",
            engine.procs(),
            base / ms
        );
        ranks *= 2;
    }
    Ok(())
}
