use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    Board, Cell, CellCount, Coord, FieldGenerator, FlagOutcome, GameConfig, GameState, Pos,
    Result, RevealOutcome, ScatterGenerator,
};

/// How the next primary intent on an unrevealed cell is interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Reveal,
    Flag,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Reveal
    }
}

/// One interactive game from the presentation layer's point of view: owns the
/// configuration, the current mode, and the live board, and swaps the board
/// wholesale on restart or first-move regeneration.
///
/// Out-of-bounds and after-the-end intents are absorbed here as no-ops, so a
/// driving loop can forward clicks without pre-filtering.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: GameConfig,
    rng: SmallRng,
    mode: Mode,
    board: Board,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Deterministic construction for tests and replays.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = Self::fresh_board(&config, &mut rng);
        Ok(Self {
            config,
            rng,
            mode: Mode::default(),
            board,
        })
    }

    fn fresh_board(config: &GameConfig, rng: &mut SmallRng) -> Board {
        Board::new(ScatterGenerator::new(rng.random()).generate(config))
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Switches between revealing and flagging. Frozen once the game ends.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.board.state().is_terminal() {
            return;
        }
        self.mode = mode;
    }

    /// Primary click intent. In `Flag` mode this places or removes a flag
    /// instead of revealing.
    ///
    /// The first reveal of a game can never lose: when it lands on a mine the
    /// layout is thrown away and the same position replayed on a fresh board
    /// until it opens safely.
    pub fn reveal(&mut self, pos: Pos) -> RevealOutcome {
        if self.mode == Mode::Flag {
            self.toggle_flag(pos);
            return RevealOutcome::NoChange;
        }

        loop {
            match self.board.reveal(pos) {
                Ok(RevealOutcome::Regenerate) => {
                    log::debug!("first reveal at {pos:?} hit a mine, regenerating the layout");
                    self.board = Self::fresh_board(&self.config, &mut self.rng);
                }
                Ok(outcome) => return outcome,
                Err(err) => {
                    log::debug!("reveal at {pos:?} ignored: {err}");
                    return RevealOutcome::NoChange;
                }
            }
        }
    }

    /// Direct flag intent, regardless of the current mode.
    pub fn toggle_flag(&mut self, pos: Pos) -> FlagOutcome {
        match self.board.toggle_flag(pos) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!("flag at {pos:?} ignored: {err}");
                FlagOutcome::NoChange
            }
        }
    }

    /// Throws the current game away and deals a fresh layout. The mode
    /// survives, everything else resets.
    pub fn restart(&mut self) {
        self.board = Self::fresh_board(&self.config, &mut self.rng);
    }

    pub fn snapshot(&self) -> Snapshot {
        let (width, height) = self.board.size();
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(self.board.cell_at((x, y)));
            }
        }
        Snapshot {
            width,
            height,
            cells,
            state: self.board.state(),
            mode: self.mode,
            mines_remaining: self.board.mines_remaining(),
            elapsed_secs: self.board.elapsed_secs(),
        }
    }
}

/// Read-only view of the whole session for rendering, cheap to serialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: Coord,
    pub height: Coord,
    /// Row-major: index `y * width + x`.
    pub cells: Vec<Cell>,
    pub state: GameState,
    pub mode: Mode,
    pub mines_remaining: CellCount,
    pub elapsed_secs: u32,
}

impl Snapshot {
    pub fn cell_at(&self, (x, y): Pos) -> Cell {
        self.cells[y as usize * self.width as usize + x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameError;

    #[test]
    fn rejects_invalid_configs() {
        assert_eq!(
            GameSession::new(GameConfig {
                width: 0,
                height: 5,
                mines: 0
            })
            .unwrap_err(),
            GameError::InvalidDimensions
        );
        assert_eq!(
            GameSession::new(GameConfig {
                width: 2,
                height: 2,
                mines: 5
            })
            .unwrap_err(),
            GameError::TooManyMines
        );
    }

    #[test]
    fn first_move_never_loses() {
        // dense board, the first click lands on a mine more often than not
        let config = GameConfig::new(3, 3, 7).unwrap();

        for seed in 0..32 {
            let mut session = GameSession::with_seed(config, seed).unwrap();
            session.reveal((1, 1));

            let state = session.board().state();
            assert_ne!(state, GameState::Lost, "seed {seed}");
            assert!(
                matches!(session.board().cell_at((1, 1)), Cell::Revealed(_)),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn flag_mode_routes_the_click_to_flagging() {
        let config = GameConfig::classic();
        let mut session = GameSession::with_seed(config, 9).unwrap();

        session.set_mode(Mode::Flag);
        assert_eq!(session.reveal((4, 4)), RevealOutcome::NoChange);
        assert_eq!(session.board().cell_at((4, 4)), Cell::Flagged);
        assert_eq!(session.board().mines_remaining(), 9);

        // a second click in flag mode lifts the flag again
        session.reveal((4, 4));
        assert_eq!(session.board().cell_at((4, 4)), Cell::Hidden);
        assert_eq!(session.board().mines_remaining(), 10);
    }

    #[test]
    fn restart_deals_an_untouched_board() {
        let config = GameConfig::classic();
        let mut session = GameSession::with_seed(config, 5).unwrap();

        session.reveal((0, 0));
        session.restart();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, GameState::NotStarted);
        assert!(snapshot.cells.iter().all(|&cell| cell == Cell::Hidden));
        assert_eq!(snapshot.mines_remaining, 10);
    }

    #[test]
    fn stray_intents_are_absorbed() {
        let config = GameConfig::classic();
        let mut session = GameSession::with_seed(config, 2).unwrap();

        assert_eq!(session.reveal((99, 99)), RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag((0, 42)), FlagOutcome::NoChange);
    }

    #[test]
    fn finished_games_ignore_everything_but_restart() {
        let config = GameConfig::new(2, 1, 1).unwrap();
        let mut session = GameSession::with_seed(config, 1).unwrap();

        // one safe cell: the first reveal wins outright
        assert_eq!(session.reveal((0, 0)), RevealOutcome::Won);
        assert_eq!(session.board().state(), GameState::Won);
        assert_eq!(session.board().mines_remaining(), 0);

        assert_eq!(session.reveal((1, 0)), RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag((1, 0)), FlagOutcome::NoChange);
        session.set_mode(Mode::Flag);
        assert_eq!(session.mode(), Mode::Reveal);

        session.restart();
        assert_eq!(session.board().state(), GameState::NotStarted);
        assert_eq!(session.mode(), Mode::Reveal);
    }

    #[test]
    fn snapshot_reflects_the_board() {
        let config = GameConfig::new(4, 3, 0).unwrap();
        let mut session = GameSession::with_seed(config, 0).unwrap();

        session.reveal((0, 0));
        let snapshot = session.snapshot();

        assert_eq!(snapshot.width, 4);
        assert_eq!(snapshot.height, 3);
        assert_eq!(snapshot.cells.len(), 12);
        assert_eq!(snapshot.state, GameState::Won);
        assert_eq!(snapshot.cell_at((3, 2)), Cell::Revealed(0));
    }

    #[test]
    fn snapshot_serializes_for_the_render_layer() {
        let config = GameConfig::new(2, 2, 0).unwrap();
        let session = GameSession::with_seed(config, 0).unwrap();

        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["width"], 2);
        assert_eq!(json["state"], "NotStarted");
        assert_eq!(json["mines_remaining"], 0);

        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, session.snapshot());
    }
}
