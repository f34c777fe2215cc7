use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board must have at least one row and one column")]
    InvalidSize,
    #[error("Mine count does not leave room for the safe start zone")]
    TooManyMines,
    #[error("Mine placement gave up before reaching the requested count")]
    PlacementFailed,
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Game already started")]
    AlreadyStarted,
}

pub type Result<T> = core::result::Result<T, GameError>;
