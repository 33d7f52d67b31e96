use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("board dimensions must be at least 1x1")]
    InvalidDimensions,
    #[error("mine density above 100 percent")]
    DensityOutOfRange,
    #[error("more mines than cells")]
    TooManyMines,
    #[error("coordinates outside the board")]
    OutOfBounds,
    #[error("game already ended, no new moves are accepted")]
    GameOver,
}

pub type Result<T> = core::result::Result<T, GameError>;
