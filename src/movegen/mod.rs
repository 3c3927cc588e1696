//! Legal move generation.
//!
//! Given a board and a source cell, computes the destinations reachable by a
//! single step and those reachable by a chain of one or more hops.

pub mod jump;

use std::collections::BTreeSet;

use crate::board::{Board, Cell};

pub use jump::jump_destinations;

/// Legal destinations for one piece.
///
/// The two sets never share a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Moves {
    pub simple: BTreeSet<Cell>,
    pub jumps: BTreeSet<Cell>,
}

impl Moves {
    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.jumps.is_empty()
    }

    /// Returns whether `dst` is reachable at all.
    pub fn contains(&self, dst: Cell) -> bool {
        self.simple.contains(&dst) || self.jumps.contains(&dst)
    }
}

/// Computes the simple and jump destinations of the piece at `source`.
///
/// Returns empty sets when `source` is empty or not playable. A cell that is
/// both adjacent and reachable by hopping is reported only as a jump.
pub fn compute_moves(board: &Board, source: Cell) -> Moves {
    if board.occupant(source).player().is_none() {
        return Moves::default();
    }

    let jumps = jump_destinations(board, source);
    let simple = source
        .neighbours()
        .filter(|c| board.is_empty(*c) && !jumps.contains(c))
        .collect();

    Moves { simple, jumps }
}
