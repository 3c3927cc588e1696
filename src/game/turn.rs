//! Turn order and the jump-lock.
//!
//! While a player is in the middle of a jump chain the turn is locked to the
//! piece that last hopped: only further hops with that piece, or an explicit
//! end of the chain, are allowed.

use serde::{Deserialize, Serialize};

use super::error::GameError;
use crate::board::{Cell, Player};

/// The piece a player is locked to while jumping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpLock {
    pub player: Player,
    #[serde(rename = "pos")]
    pub cell: Cell,
}

/// Whose turn it is and whether that player is mid-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle { to_move: Player },
    Locked { to_move: Player, cell: Cell },
}

impl TurnState {
    /// The state at the start of a match: player one to move.
    pub const fn initial() -> Self {
        TurnState::Idle { to_move: Player::One }
    }

    pub fn to_move(&self) -> Player {
        match *self {
            TurnState::Idle { to_move } | TurnState::Locked { to_move, .. } => to_move,
        }
    }

    pub fn jump_lock(&self) -> Option<JumpLock> {
        match *self {
            TurnState::Idle { .. } => None,
            TurnState::Locked { to_move, cell } => Some(JumpLock { player: to_move, cell }),
        }
    }

    /// Checks that `player` may move the piece on `src` in this state.
    pub fn check_source(&self, player: Player, src: Cell) -> Result<(), GameError> {
        if player != self.to_move() {
            return Err(GameError::NotYourTurn);
        }
        match *self {
            TurnState::Locked { cell, .. } if cell != src => Err(GameError::MustContinueJump),
            _ => Ok(()),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, TurnState::Locked { .. })
    }

    /// Transition after an accepted simple move: the turn passes.
    pub fn after_step(&mut self) {
        *self = TurnState::Idle {
            to_move: self.to_move().opponent(),
        };
    }

    /// Transition after an accepted hop landing on `landing`.
    ///
    /// Locks the turn to `landing` when further hops exist from there,
    /// otherwise passes the turn.
    pub fn after_hop(&mut self, landing: Cell, more_hops: bool) {
        let to_move = self.to_move();
        *self = if more_hops {
            TurnState::Locked { to_move, cell: landing }
        } else {
            TurnState::Idle { to_move: to_move.opponent() }
        };
    }

    /// Ends the chain held by `player` and passes the turn.
    pub fn end_jump(&mut self, player: Player) -> Result<(), GameError> {
        match *self {
            TurnState::Locked { to_move, .. } if to_move == player => {
                *self = TurnState::Idle { to_move: player.opponent() };
                Ok(())
            }
            _ => Err(GameError::NoJumpChain),
        }
    }

    /// Ends the chain if `player` holds it, passing the turn. Returns whether
    /// a chain was ended; any other state is left as is.
    pub fn release(&mut self, player: Player) -> bool {
        self.end_jump(player).is_ok()
    }

    /// Drops any lock without passing the turn. Used when the match ends.
    pub fn clear_lock(&mut self) {
        *self = TurnState::Idle { to_move: self.to_move() };
    }
}

impl Default for TurnState {
    fn default() -> Self {
        TurnState::initial()
    }
}
