//! Rejection reasons for player actions.

use thiserror::Error;

use crate::board::Cell;

/// Broad category of a rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A spectator tried a player-only action.
    Role,
    /// Acting out of turn, or after the match ended.
    Turn,
    /// Breaking the rules of an active jump chain.
    JumpLock,
    /// Destination not reachable from the given source.
    IllegalDestination,
    /// Source or destination outside the playable grid.
    MalformedCoordinates,
}

/// Why an action was rejected. No variant mutates any state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("only players can {action}")]
    SpectatorAction { action: &'static str },

    #[error("the match is over")]
    MatchOver,

    #[error("the match is already over")]
    AlreadyOver,

    #[error("not your turn")]
    NotYourTurn,

    #[error("cell {0} is outside the playable board")]
    OffBoard(Cell),

    #[error("must continue jump with same piece")]
    MustContinueJump,

    #[error("destination not a legal simple move")]
    JumpOnly,

    #[error("no jump chain in progress")]
    NoJumpChain,

    #[error("no piece of yours at {0}")]
    NotYourPiece(Cell),

    #[error("no legal move to that destination")]
    IllegalDestination,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::SpectatorAction { .. } => ErrorKind::Role,
            GameError::MatchOver | GameError::AlreadyOver | GameError::NotYourTurn => {
                ErrorKind::Turn
            }
            GameError::OffBoard(_) => ErrorKind::MalformedCoordinates,
            GameError::MustContinueJump | GameError::JumpOnly | GameError::NoJumpChain => {
                ErrorKind::JumpLock
            }
            GameError::NotYourPiece(_) | GameError::IllegalDestination => {
                ErrorKind::IllegalDestination
            }
        }
    }
}
