use crate::{Grid, Result};

/// Game engine for Game of Life on a torus
pub trait Engine {
    /// Returns the current state of the field.
    fn current_state(&self) -> &Grid;

    /// Advances the field by `generations` generations.
    ///
    /// # Errors
    ///
    /// Engines that spread the work over several ranks fail if a rank
    /// cannot be reached; the field is left at its previous state then.
    fn update(&mut self, generations: u64) -> Result<()>;

    /// Total number of alive cells in the field.
    fn population(&self) -> usize {
        self.current_state().population()
    }

    /// Returns multiline string reporting engine stats.
    fn statistics(&self) -> String {
        String::new()
    }
}
