//! Board occupancy and camp geometry.
//!
//! A pure data structure: it answers occupancy and region queries and lets the
//! match controller relocate pieces. All legality checks live in `movegen` and
//! `game`.

use super::cell::{Cell, Player, BOARD_SIZE};

/// Number of rows in the triangular camp of each player.
pub const CAMP_DEPTH: i32 = 5;

/// Number of cells in each camp, and pieces per player in the standard layout.
pub const CAMP_SIZE: usize = (CAMP_DEPTH * (CAMP_DEPTH + 1) / 2) as usize;

const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// What sits on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Occupant {
    #[default]
    Empty,
    Piece(Player),
}

impl Occupant {
    /// Wire code used in the state grid: 0 empty, 1 or 2 for a piece.
    pub const fn code(self) -> u8 {
        match self {
            Occupant::Empty => 0,
            Occupant::Piece(p) => p.number(),
        }
    }

    pub fn player(self) -> Option<Player> {
        match self {
            Occupant::Empty => None,
            Occupant::Piece(p) => Some(p),
        }
    }
}

/// Returns the home camp of a player.
///
/// Player one owns the top-left triangle, player two its mirror image in the
/// bottom-right corner.
pub fn camp_cells(player: Player) -> Vec<Cell> {
    let last = BOARD_SIZE as i32 - 1;
    let mut cells = Vec::with_capacity(CAMP_SIZE);
    for r in 0..CAMP_DEPTH {
        for c in 0..CAMP_DEPTH - r {
            cells.push(match player {
                Player::One => Cell::new(r, c),
                Player::Two => Cell::new(last - r, last - c),
            });
        }
    }
    cells
}

/// The playfield: occupancy of every cell plus which cells are playable.
///
/// Uses flat fixed-size arrays indexed by `Cell::index` so the whole board is
/// a cheap `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [Occupant; CELL_COUNT],
    playable: [bool; CELL_COUNT],
}

impl Board {
    /// Creates a board with every cell playable and no pieces.
    pub fn empty() -> Self {
        Board {
            cells: [Occupant::Empty; CELL_COUNT],
            playable: [true; CELL_COUNT],
        }
    }

    /// Creates the starting position: each camp filled with its owner's pieces.
    pub fn standard() -> Self {
        let mut board = Board::empty();
        for player in [Player::One, Player::Two] {
            for cell in camp_cells(player) {
                board.place(cell, Occupant::Piece(player));
            }
        }
        board
    }

    /// Marks a cell as not part of the playfield, removing anything on it.
    pub fn block(&mut self, cell: Cell) {
        if cell.in_bounds() {
            self.playable[cell.index()] = false;
            self.cells[cell.index()] = Occupant::Empty;
        }
    }

    pub fn is_playable(&self, cell: Cell) -> bool {
        cell.in_bounds() && self.playable[cell.index()]
    }

    /// Returns the occupant of a cell. Off-board and unplayable cells are empty.
    pub fn occupant(&self, cell: Cell) -> Occupant {
        if self.is_playable(cell) {
            self.cells[cell.index()]
        } else {
            Occupant::Empty
        }
    }

    /// Returns true when the cell is playable and holds no piece.
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.is_playable(cell) && self.cells[cell.index()] == Occupant::Empty
    }

    /// Sets the occupant of a playable cell. Writes to unplayable cells are
    /// ignored.
    pub fn place(&mut self, cell: Cell, occupant: Occupant) {
        debug_assert!(self.is_playable(cell), "place on unplayable cell {}", cell);
        if self.is_playable(cell) {
            self.cells[cell.index()] = occupant;
        }
    }

    /// Moves whatever is on `src` to `dst`, leaving `src` empty.
    pub fn relocate(&mut self, src: Cell, dst: Cell) {
        let occupant = self.occupant(src);
        self.place(src, Occupant::Empty);
        self.place(dst, occupant);
    }

    /// Playable cells of the player's home camp.
    pub fn home_region(&self, player: Player) -> Vec<Cell> {
        camp_cells(player)
            .into_iter()
            .filter(|c| self.is_playable(*c))
            .collect()
    }

    /// The cells the player must fill to win: the opponent's home camp.
    pub fn goal_region(&self, player: Player) -> Vec<Cell> {
        self.home_region(player.opponent())
    }

    /// Returns true when every goal cell holds one of the player's pieces.
    /// A goal with no playable cells can never be won.
    pub fn is_victory(&self, player: Player) -> bool {
        let goal = self.goal_region(player);
        !goal.is_empty()
            && goal
                .iter()
                .all(|c| self.occupant(*c) == Occupant::Piece(player))
    }

    pub fn piece_count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter(|o| **o == Occupant::Piece(player))
            .count()
    }

    /// Occupancy as rows of wire codes, as sent in state snapshots.
    pub fn to_grid(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(BOARD_SIZE)
            .map(|row| row.iter().map(|o| o.code()).collect())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_piece_counts() {
        let board = Board::standard();
        assert_eq!(board.piece_count(Player::One), CAMP_SIZE);
        assert_eq!(board.piece_count(Player::Two), CAMP_SIZE);
        assert_eq!(CAMP_SIZE, 15);
    }

    #[test]
    fn camps_are_disjoint_mirrors() {
        let a = camp_cells(Player::One);
        let b = camp_cells(Player::Two);
        assert!(a.iter().all(|c| !b.contains(c)));
        assert!(a.contains(&Cell::new(0, 0)));
        assert!(a.contains(&Cell::new(4, 0)));
        assert!(!a.contains(&Cell::new(4, 1)));
        assert!(b.contains(&Cell::new(15, 15)));
        assert!(b.contains(&Cell::new(11, 15)));
    }

    #[test]
    fn standard_layout_fills_camps() {
        let board = Board::standard();
        for cell in board.home_region(Player::One) {
            assert_eq!(board.occupant(cell), Occupant::Piece(Player::One));
        }
        for cell in board.home_region(Player::Two) {
            assert_eq!(board.occupant(cell), Occupant::Piece(Player::Two));
        }
        assert!(board.is_empty(Cell::new(7, 7)));
    }

    #[test]
    fn goal_region_is_opponent_home() {
        let board = Board::standard();
        assert_eq!(board.goal_region(Player::One), board.home_region(Player::Two));
    }

    #[test]
    fn off_board_is_not_playable() {
        let board = Board::empty();
        assert!(!board.is_playable(Cell::new(-1, 0)));
        assert!(!board.is_empty(Cell::new(0, 16)));
        assert_eq!(board.occupant(Cell::new(20, 20)), Occupant::Empty);
    }

    #[test]
    fn blocked_cell_is_unplayable() {
        let mut board = Board::standard();
        board.block(Cell::new(0, 0));
        assert!(!board.is_playable(Cell::new(0, 0)));
        assert!(!board.is_empty(Cell::new(0, 0)));
        assert_eq!(board.home_region(Player::One).len(), CAMP_SIZE - 1);
    }

    #[test]
    fn relocate_moves_piece() {
        let mut board = Board::standard();
        board.relocate(Cell::new(4, 0), Cell::new(5, 0));
        assert!(board.is_empty(Cell::new(4, 0)));
        assert_eq!(board.occupant(Cell::new(5, 0)), Occupant::Piece(Player::One));
        assert_eq!(board.piece_count(Player::One), CAMP_SIZE);
    }

    #[test]
    fn victory_requires_full_goal() {
        let mut board = Board::empty();
        let goal = board.goal_region(Player::One);
        for cell in &goal[1..] {
            board.place(*cell, Occupant::Piece(Player::One));
        }
        assert!(!board.is_victory(Player::One));
        board.place(goal[0], Occupant::Piece(Player::Two));
        assert!(!board.is_victory(Player::One));
        board.place(goal[0], Occupant::Piece(Player::One));
        assert!(board.is_victory(Player::One));
        assert!(!board.is_victory(Player::Two));
    }

    #[test]
    fn fully_blocked_goal_is_never_won() {
        let mut board = Board::empty();
        for cell in camp_cells(Player::Two) {
            board.block(cell);
        }
        assert!(board.goal_region(Player::One).is_empty());
        assert!(!board.is_victory(Player::One));
    }

    #[test]
    fn grid_codes() {
        let grid = Board::standard().to_grid();
        assert_eq!(grid.len(), BOARD_SIZE);
        assert_eq!(grid[0][0], 1);
        assert_eq!(grid[15][15], 2);
        assert_eq!(grid[8][8], 0);
    }
}
