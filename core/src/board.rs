use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::ops::BitOr;

use chrono::prelude::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{AsIndex, Cell, CellCount, Field, GameError, Pos, Result};

/// Progress of a single game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GameState {
    /// No cell has been revealed yet.
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// The game has ended and accepts no further moves.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Result of a reveal intent, possibly merged over a whole cascade.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    /// A mine was hit before any cell had been revealed. Nothing was mutated;
    /// the caller discards the layout and replays the same position on a
    /// fresh board.
    Regenerate,
    Won,
    Exploded,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange | Self::Regenerate)
    }
}

/// Merge for multi-cell reveals: the most decisive outcome wins.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (Exploded, _) | (_, Exploded) => Exploded,
            (Won, _) | (_, Won) => Won,
            (Regenerate, _) | (_, Regenerate) => Regenerate,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Result of a flag intent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Placed,
    Removed,
    /// The flag supply is capped at the mine count; the cell stays unflagged.
    NoFlagsLeft,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Placed | Self::Removed)
    }
}

/// A single game: the mine layout plus everything the player has done to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    field: Field,
    cells: Array2<Cell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: GameState,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl Board {
    pub fn new(field: Field) -> Self {
        let size = field.size();
        Self {
            field,
            cells: Array2::default(size.as_index()),
            revealed_count: 0,
            flagged_count: 0,
            state: GameState::default(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn size(&self) -> Pos {
        self.field.size()
    }

    pub fn mine_count(&self) -> CellCount {
        self.field.mine_count()
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Flags still available to place. Never negative, the flag supply is
    /// capped at the mine count.
    pub fn mines_remaining(&self) -> CellCount {
        self.field.mine_count() - self.flagged_count
    }

    pub fn cell_at(&self, pos: Pos) -> Cell {
        self.cells[pos.as_index()]
    }

    /// Seconds since the first reveal, frozen once the game ends.
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    /// Places or removes a flag on an unrevealed cell. Revealed cells are
    /// left alone, and no more flags can be out at once than there are mines.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<FlagOutcome> {
        use FlagOutcome::*;

        let pos = self.field.check_pos(pos)?;
        self.check_not_over()?;

        Ok(match self.cells[pos.as_index()] {
            Cell::Hidden if self.flagged_count < self.field.mine_count() => {
                self.cells[pos.as_index()] = Cell::Flagged;
                self.flagged_count += 1;
                Placed
            }
            Cell::Hidden => NoFlagsLeft,
            Cell::Flagged => {
                self.cells[pos.as_index()] = Cell::Hidden;
                self.flagged_count -= 1;
                Removed
            }
            _ => NoChange,
        })
    }

    /// Reveals a cell. A flagged cell is immune, a hidden cell opens (with
    /// flood fill from a zero), and a cell that is already open chords.
    pub fn reveal(&mut self, pos: Pos) -> Result<RevealOutcome> {
        let pos = self.field.check_pos(pos)?;
        self.check_not_over()?;

        Ok(match self.cells[pos.as_index()] {
            Cell::Hidden => self.reveal_cell(pos),
            Cell::Revealed(count) => self.chord(pos, count),
            _ => RevealOutcome::NoChange,
        })
    }

    /// Chorded reveal of a numbered cell that is already open: with exactly
    /// as many flagged neighbors as mines every other neighbor opens, with
    /// more flags than mines the move counts as a misplay and loses the game.
    fn chord(&mut self, pos: Pos, count: u8) -> RevealOutcome {
        let flagged = self
            .field
            .neighbors(pos)
            .filter(|&p| self.cells[p.as_index()] == Cell::Flagged)
            .count() as u8;

        match flagged.cmp(&count) {
            Ordering::Greater => {
                log::debug!("chord at {pos:?} with {flagged} flags on a {count}, misplay");
                self.finish(false);
                RevealOutcome::Exploded
            }
            Ordering::Equal => self
                .field
                .neighbors(pos)
                .map(|p| self.reveal_cell(p))
                .reduce(BitOr::bitor)
                .unwrap_or(RevealOutcome::NoChange),
            Ordering::Less => RevealOutcome::NoChange,
        }
    }

    fn reveal_cell(&mut self, pos: Pos) -> RevealOutcome {
        match (self.cells[pos.as_index()], self.field.is_mine(pos)) {
            (Cell::Hidden, true) => {
                if self.state.is_initial() && self.field.safe_count() > 0 {
                    return RevealOutcome::Regenerate;
                }
                self.cells[pos.as_index()] = Cell::Exploded;
                self.finish(false);
                RevealOutcome::Exploded
            }
            (Cell::Hidden, false) => {
                let count = self.field.adjacent_mines(pos);
                self.open(pos, count);
                if count == 0 {
                    self.flood_from(pos);
                }

                if self.revealed_count == self.field.safe_count() {
                    self.finish(true);
                    RevealOutcome::Won
                } else {
                    self.start_clock();
                    RevealOutcome::Revealed
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    fn open(&mut self, pos: Pos, count: u8) {
        self.cells[pos.as_index()] = Cell::Revealed(count);
        self.revealed_count += 1;
        log::trace!("opened {pos:?}, {count} mines adjacent");
    }

    /// Explicit-worklist flood fill from a zero-count cell. Each position is
    /// enqueued at most once, so the loop is bounded by the grid area.
    fn flood_from(&mut self, origin: Pos) {
        let mut visited = HashSet::from([origin]);
        let mut pending: VecDeque<Pos> = self
            .field
            .neighbors(origin)
            .filter(|&p| self.cells[p.as_index()] == Cell::Hidden)
            .collect();

        while let Some(pos) = pending.pop_front() {
            if !visited.insert(pos) {
                continue;
            }
            if self.cells[pos.as_index()] != Cell::Hidden {
                continue;
            }

            let count = self.field.adjacent_mines(pos);
            self.open(pos, count);

            if count == 0 {
                pending.extend(
                    self.field
                        .neighbors(pos)
                        .filter(|&p| self.cells[p.as_index()] == Cell::Hidden)
                        .filter(|p| !visited.contains(p)),
                );
            }
        }
    }

    fn start_clock(&mut self) {
        if self.state.is_initial() {
            let now = Utc::now();
            log::debug!("first reveal at {now}");
            self.started_at = Some(now);
            self.state = GameState::InProgress;
        }
    }

    fn finish(&mut self, won: bool) {
        if self.state.is_terminal() {
            return;
        }

        self.state = if won { GameState::Won } else { GameState::Lost };
        let now = Utc::now();
        self.started_at.get_or_insert(now);
        self.ended_at = Some(now);
        log::debug!("game over at {now}, won: {won}");
        self.disclose(won);
    }

    /// One-shot disclosure once the game ends: on a loss unflagged mines are
    /// shown and wrong flags marked, on a win the remaining mines pick up
    /// their flags. Correctly flagged mines keep their flag either way.
    fn disclose(&mut self, won: bool) {
        let (width, height) = self.field.size();
        for x in 0..width {
            for y in 0..height {
                let pos = (x, y);
                match (self.cells[pos.as_index()], self.field.is_mine(pos)) {
                    (Cell::Hidden, true) => {
                        if won {
                            self.cells[pos.as_index()] = Cell::Flagged;
                            self.flagged_count += 1;
                        } else {
                            self.cells[pos.as_index()] = Cell::Mine;
                        }
                    }
                    (Cell::Flagged, false) => {
                        self.cells[pos.as_index()] = Cell::WrongFlag;
                    }
                    _ => {}
                }
            }
        }
    }

    fn check_not_over(&self) -> Result<()> {
        if self.state.is_terminal() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }
}
