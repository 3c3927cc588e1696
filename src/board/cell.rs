//! Grid coordinates, players, and the eight step directions.
//!
//! Coordinates are signed so that a client-supplied cell outside the grid can
//! still be represented and rejected by the match controller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side length of the square grid.
pub const BOARD_SIZE: usize = 16;

/// A grid coordinate. Serialized as a `[row, col]` JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Cell { row, col }
    }

    /// Returns whether the coordinate lies inside the square grid.
    pub fn in_bounds(self) -> bool {
        let n = BOARD_SIZE as i32;
        (0..n).contains(&self.row) && (0..n).contains(&self.col)
    }

    /// Returns the cell `steps` positions away in `dir`.
    pub fn offset(self, dir: Direction, steps: i32) -> Cell {
        let (dr, dc) = dir.delta();
        Cell::new(self.row + dr * steps, self.col + dc * steps)
    }

    /// Returns the up to eight in-bounds neighbours of this cell.
    pub fn neighbours(self) -> impl Iterator<Item = Cell> {
        ALL_DIRECTIONS
            .iter()
            .map(move |&d| self.offset(d, 1))
            .filter(|c| c.in_bounds())
    }

    /// Row-major index into a `BOARD_SIZE * BOARD_SIZE` array.
    /// Only meaningful for in-bounds cells.
    pub(crate) fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Cell::new(row, col)
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the eight orthogonal or diagonal step directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
    Direction::NorthWest,
    Direction::NorthEast,
    Direction::SouthWest,
    Direction::SouthEast,
];

impl Direction {
    /// Returns the (row, col) step for this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (-1, 1),
            Direction::SouthWest => (1, -1),
            Direction::SouthEast => (1, 1),
        }
    }
}

/// One of the two player slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Wire number of the player (1 or 2).
    pub const fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Player> {
        match n {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Index into per-player arrays.
    pub(crate) const fn slot(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

impl Serialize for Player {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for Player {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = u8::deserialize(deserializer)?;
        Player::from_number(n)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid player number {}", n)))
    }
}
