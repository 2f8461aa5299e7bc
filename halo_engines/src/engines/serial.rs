use crate::{Engine, Grid, Result, Strategy};

/// Whole torus on the calling thread.
pub struct SerialEngine {
    grid: Grid,
    strategy: Strategy,
}

impl SerialEngine {
    pub fn new(grid: Grid, strategy: Strategy) -> Self {
        Self { grid, strategy }
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }
}

impl Engine for SerialEngine {
    fn current_state(&self) -> &Grid {
        &self.grid
    }

    fn update(&mut self, generations: u64) -> Result<()> {
        for _ in 0..generations {
            self.grid.update_with(self.strategy);
        }
        Ok(())
    }

    fn statistics(&self) -> String {
        let (rows, cols) = self.grid.shape();
        format!("serial {:?}\ngrid: {}x{}\n", self.strategy, rows, cols)
    }
}
