//! Maze model: the cell lattice, the carving walk and its configuration.
//!
//! ```
//! use amazing::maze::MazeConfig;
//!
//! let grid = MazeConfig::new().size(21, 15).seed(42).generate()?;
//! assert!(!grid.is_wall(1, 1));
//! print!("{grid}");
//! # Ok::<(), amazing::Error>(())
//! ```

mod generator;
mod grid;

use std::num::NonZeroU32;

pub use generator::{
    CandidateOrder, FixedOrder, LoopPolicy, MazeGenerator, RandomOrder, open_entrance_and_exit,
};
pub use grid::{Cell, Coord, Grid};

use crate::error::{Error, Result};

/// Smallest side length that still leaves an interior cell to carve.
pub const MIN_SIDE: i32 = 3;

/// Where every walk starts.
pub const START: Coord = Coord::new(1, 1);

/// Parameters for one generated maze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeConfig {
    pub width: i32,
    pub height: i32,
    /// Fixed seed for reproducible mazes; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub loops: LoopPolicy,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 13,
            height: 13,
            seed: None,
            loops: LoopPolicy::default(),
        }
    }
}

impl MazeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn strict(mut self) -> Self {
        self.loops = LoopPolicy::Strict;
        self
    }

    pub fn braid(mut self, modulus: NonZeroU32) -> Self {
        self.loops = LoopPolicy::braid(modulus);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_SIDE || self.height < MIN_SIDE {
            return Err(Error::MazeTooSmall {
                width: self.width,
                height: self.height,
                min: MIN_SIDE,
            });
        }
        Ok(())
    }

    /// Builds the grid, carves it from [`START`] and opens the entrance and exit.
    pub fn generate(&self) -> Result<Grid> {
        self.validate()?;
        let order = match self.seed {
            Some(seed) => RandomOrder::seeded(seed),
            None => RandomOrder::from_entropy(),
        };
        Ok(self.generate_with(order))
    }

    /// Like [`generate`](Self::generate) but with a caller-supplied neighbour order.
    /// Skips validation; undersized grids simply end up with nothing carved.
    pub fn generate_with<O: CandidateOrder>(&self, order: O) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        MazeGenerator::new(order, self.loops).generate(&mut grid, START);
        open_entrance_and_exit(&mut grid);

        log::info!(
            "generated {}x{} maze ({:?}, seed {:?}): {} passages",
            self.width,
            self.height,
            self.loops,
            self.seed,
            grid.passage_count()
        );
        grid
    }
}
