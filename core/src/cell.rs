use serde::{Deserialize, Serialize};

/// Player-visible state of a single board cell.
///
/// `Exploded`, `Mine` and `WrongFlag` only appear once the game is over;
/// while it runs every cell is hidden, flagged, or revealed with its
/// adjacent-mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Hidden,
    Flagged,
    Revealed(u8),
    /// The mine whose reveal ended the game.
    Exploded,
    /// An unflagged mine, disclosed when the game is lost.
    Mine,
    /// A flagged cell that held no mine, disclosed when the game is lost.
    WrongFlag,
}

impl Cell {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Exploded | Self::Mine)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged | Self::WrongFlag)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Hidden
    }
}
