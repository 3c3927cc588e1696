//! Board representation.
//!
//! Contains coordinates, players, occupancy, and the camp regions used for
//! the starting layout and win detection.

pub mod cell;
pub mod state;

pub use cell::{Cell, Direction, Player, ALL_DIRECTIONS, BOARD_SIZE};
pub use state::{camp_cells, Board, Occupant, CAMP_DEPTH, CAMP_SIZE};
