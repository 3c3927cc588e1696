//! Multi-hop jump search.
//!
//! A hop goes from A over an occupied neighbour B to the empty playable cell
//! C directly beyond it. Chains of hops are a reachability question, answered
//! with a breadth-first search that visits each cell at most once.

use std::collections::{BTreeSet, VecDeque};

use crate::board::{Board, Cell, ALL_DIRECTIONS, BOARD_SIZE};

/// Returns the landing cell of a single hop from `from` in every direction
/// where one is possible.
pub fn single_hops(board: &Board, from: Cell) -> impl Iterator<Item = Cell> + '_ {
    ALL_DIRECTIONS.iter().filter_map(move |&dir| {
        let over = from.offset(dir, 1);
        let landing = from.offset(dir, 2);
        let can_hop = board.occupant(over).player().is_some() && board.is_empty(landing);
        can_hop.then_some(landing)
    })
}

/// Returns every cell reachable from `source` by one or more consecutive hops.
///
/// The source itself is never included. The board is read as given: the
/// moving piece still counts as occupying `source` for the whole search.
pub fn jump_destinations(board: &Board, source: Cell) -> BTreeSet<Cell> {
    let mut reached = BTreeSet::new();
    if !board.is_playable(source) {
        return reached;
    }

    let mut visited = [false; BOARD_SIZE * BOARD_SIZE];
    visited[source.index()] = true;
    let mut queue = VecDeque::from([source]);

    while let Some(cell) = queue.pop_front() {
        for landing in single_hops(board, cell) {
            if visited[landing.index()] {
                continue;
            }
            visited[landing.index()] = true;
            reached.insert(landing);
            queue.push_back(landing);
        }
    }

    reached
}
