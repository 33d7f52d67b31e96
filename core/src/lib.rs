//! Rule engine for the classic game of Minesweeper.
//!
//! The crate owns everything with game logic in it: mine placement, adjacency
//! counts, flood-fill revelation, chording, flags, and win/loss detection.
//! Rendering and input handling are left to the embedding application, which
//! drives a [`GameSession`] with intents and draws whatever [`Snapshot`]
//! reports back.

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use field::*;
pub use generator::*;
pub use session::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod field;
mod generator;
mod session;
mod types;

/// Shape of a game: board dimensions and how many mines to bury in it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        let config = Self {
            width,
            height,
            mines,
        };
        config.validate()?;
        Ok(config)
    }

    /// Derives the mine count from a density percentage of the cell count,
    /// rounded down.
    pub fn from_density(width: Coord, height: Coord, density_percent: u8) -> Result<Self> {
        if density_percent > 100 {
            return Err(GameError::DensityOutOfRange);
        }
        let mines = (area(width, height) as u64 * density_percent as u64 / 100) as CellCount;
        Self::new(width, height, mines)
    }

    /// 10x10 at 10% density.
    pub const fn classic() -> Self {
        Self {
            width: 10,
            height: 10,
            mines: 10,
        }
    }

    /// Checks the invariants a hand-built value might violate.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidDimensions);
        }
        if self.mines > self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    pub const fn size(&self) -> Pos {
        (self.width, self.height)
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.width, self.height)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}
