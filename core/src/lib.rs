#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use generator::*;
pub use solver::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod generator;
mod solver;
mod tile;
mod types;

/// Upper bound on the guaranteed mine-free zone around the start tile: the
/// tile itself plus a full Moore neighborhood.
pub(crate) const START_ZONE_CELLS: CellCount = 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// Rejects configurations that random placement could never satisfy.
    /// The bound reserves a full start zone even though corner starts need
    /// less; placement itself carries an attempt cap for anything the fixed
    /// bound cannot see.
    pub fn validate(&self) -> Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(GameError::InvalidSize);
        }
        if self.mines.saturating_add(START_ZONE_CELLS) > self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }
}
