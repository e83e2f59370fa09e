//! Error types for move validation and game orchestration.

use derive_more::{Display, Error};

/// Why a checked placement was refused. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Position lies outside the 64-cell grid.
    #[display("position {position} is off the board")]
    OutOfRange { position: usize },

    /// Target cell already holds a tile.
    #[display("cell {position} is already occupied")]
    OccupiedCell { position: usize },

    /// Empty, in range, but not in this turn's legal-move set.
    #[display("{position} is not a legal move")]
    NotALegalMove { position: usize },
}

impl MoveError {
    pub fn position(&self) -> usize {
        match *self {
            MoveError::OutOfRange { position }
            | MoveError::OccupiedCell { position }
            | MoveError::NotALegalMove { position } => position,
        }
    }
}

/// Failures surfaced by the turn loop in [`crate::game::Game`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    #[display("game is already over")]
    GameOver,

    /// The move source gave up (closed input, script ran out).
    #[display("move source produced no selection")]
    SourceExhausted,

    #[display("move source was rejected {attempts} times in a row")]
    TooManyRejections { attempts: usize },

    #[display("{_0}")]
    Move(#[error(source)] MoveError),
}

impl From<MoveError> for GameError {
    fn from(err: MoveError) -> Self {
        GameError::Move(err)
    }
}
