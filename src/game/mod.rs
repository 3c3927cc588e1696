//! Match controller.
//!
//! Owns the board, the turn state, the winner, the chat log and the reset
//! votes of one match, and applies player actions to them. Every action
//! either commits completely or is rejected with a `GameError` and leaves the
//! match untouched.

pub mod chat;
pub mod error;
pub mod turn;

use crate::board::{Board, Cell, Occupant, Player};
use crate::movegen::compute_moves;

pub use chat::{ChatAuthor, ChatEntry, ChatLog};
pub use error::{ErrorKind, GameError};
pub use turn::{JumpLock, TurnState};

/// How an accepted move travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Step,
    Hop,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub kind: MoveKind,
    pub src: Cell,
    pub dst: Cell,
    /// Set when this move completed the mover's goal region.
    pub winner: Option<Player>,
    pub jump_lock: Option<JumpLock>,
    /// Whether pending reset votes were withdrawn by this move.
    pub votes_cleared: bool,
}

/// Result of a reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetVote {
    /// The vote was recorded; the other player has not voted yet.
    Recorded,
    /// This player had already voted.
    AlreadyPending,
    /// Both players have now voted.
    Agreed,
}

/// One reset flag per player slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetVotes([bool; 2]);

impl ResetVotes {
    pub fn has_voted(&self, player: Player) -> bool {
        self.0[player.slot()]
    }

    pub fn any(&self) -> bool {
        self.0[0] || self.0[1]
    }

    pub fn both(&self) -> bool {
        self.0[0] && self.0[1]
    }

    fn set(&mut self, player: Player, vote: bool) {
        self.0[player.slot()] = vote;
    }

    /// Clears both flags, returning whether any was set.
    fn clear(&mut self) -> bool {
        let had_any = self.any();
        self.0 = [false; 2];
        had_any
    }
}

/// A single match between the two player slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    board: Board,
    turn: TurnState,
    winner: Option<Player>,
    chat: ChatLog,
    reset_votes: ResetVotes,
}

impl Match {
    /// Creates a match in the standard starting position.
    pub fn new() -> Self {
        Match::from_board(Board::standard())
    }

    /// Creates a match from an arbitrary position with player one to move.
    pub fn from_board(board: Board) -> Self {
        Match {
            board,
            turn: TurnState::initial(),
            winner: None,
            chat: ChatLog::default(),
            reset_votes: ResetVotes::default(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    pub fn to_move(&self) -> Player {
        self.turn.to_move()
    }

    pub fn jump_lock(&self) -> Option<JumpLock> {
        self.turn.jump_lock()
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn reset_votes(&self) -> ResetVotes {
        self.reset_votes
    }

    /// Validates and applies a move of `player`'s piece from `src` to `dst`.
    pub fn apply_move(
        &mut self,
        player: Player,
        src: Cell,
        dst: Cell,
    ) -> Result<MoveOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::MatchOver);
        }
        if player != self.turn.to_move() {
            return Err(GameError::NotYourTurn);
        }
        for cell in [src, dst] {
            if !self.board.is_playable(cell) {
                return Err(GameError::OffBoard(cell));
            }
        }
        self.turn.check_source(player, src)?;
        if self.board.occupant(src) != Occupant::Piece(player) {
            return Err(GameError::NotYourPiece(src));
        }

        let moves = compute_moves(&self.board, src);
        let kind = if moves.jumps.contains(&dst) {
            MoveKind::Hop
        } else if moves.simple.contains(&dst) {
            if self.turn.is_locked() {
                return Err(GameError::JumpOnly);
            }
            MoveKind::Step
        } else {
            return Err(GameError::IllegalDestination);
        };

        self.board.relocate(src, dst);

        if self.board.is_victory(player) {
            self.winner = Some(player);
            self.turn.clear_lock();
        } else {
            match kind {
                MoveKind::Step => self.turn.after_step(),
                MoveKind::Hop => {
                    let more_hops = !compute_moves(&self.board, dst).jumps.is_empty();
                    self.turn.after_hop(dst, more_hops);
                }
            }
        }

        let votes_cleared = self.reset_votes.clear();
        if votes_cleared {
            self.chat.note("Pending restart votes were cleared by a new move.");
        }
        if let Some(winner) = self.winner {
            self.chat.note(format!("Player {} wins!", winner.number()));
        }

        Ok(MoveOutcome {
            kind,
            src,
            dst,
            winner: self.winner,
            jump_lock: self.turn.jump_lock(),
            votes_cleared,
        })
    }

    /// Ends the jump chain `player` is locked into and passes the turn.
    pub fn end_jump(&mut self, player: Player) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::MatchOver);
        }
        self.turn.end_jump(player)
    }

    /// Ends `player`'s jump chain if they hold one, passing the turn.
    /// Returns whether a chain was ended.
    pub fn release_lock(&mut self, player: Player) -> bool {
        self.turn.release(player)
    }

    /// Concedes the match: the opponent wins immediately.
    pub fn resign(&mut self, player: Player) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::AlreadyOver);
        }
        self.winner = Some(player.opponent());
        self.turn.clear_lock();
        self.reset_votes.clear();
        self.chat.note(format!("Player {} resigned.", player.number()));
        Ok(())
    }

    /// Records `player`'s request to restart the match.
    ///
    /// Does not restart by itself; the caller replaces the match with
    /// [`Match::restart`] once this returns [`ResetVote::Agreed`].
    pub fn vote_reset(&mut self, player: Player) -> ResetVote {
        if self.reset_votes.has_voted(player) {
            return ResetVote::AlreadyPending;
        }
        self.reset_votes.set(player, true);
        self.chat
            .note(format!("Player {} requested a restart.", player.number()));
        if self.reset_votes.both() {
            self.chat.note("Both players agreed to restart the match.");
            ResetVote::Agreed
        } else {
            ResetVote::Recorded
        }
    }

    /// Withdraws `player`'s reset vote. Returns whether one was pending.
    pub fn withdraw_vote(&mut self, player: Player) -> bool {
        let had = self.reset_votes.has_voted(player);
        self.reset_votes.set(player, false);
        had
    }

    /// Replaces this match with a fresh one in the starting position.
    /// The chat log carries over.
    pub fn restart(&mut self) {
        let chat = std::mem::take(&mut self.chat);
        *self = Match { chat, ..Match::new() };
        self.chat.note("Match restarted.");
    }

    /// Appends a chat line. Allowed in every state, including after the end.
    pub fn post_chat(&mut self, author: ChatAuthor, text: impl Into<String>) {
        self.chat.push(author, text);
    }

    /// Appends a server note to the chat log.
    pub fn note(&mut self, text: impl Into<String>) {
        self.chat.note(text);
    }
}

impl Default for Match {
    fn default() -> Self {
        Match::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CAMP_SIZE;

    fn match_with(pieces: &[(i32, i32, Player)]) -> Match {
        let mut board = Board::empty();
        for &(r, c, p) in pieces {
            board.place(Cell::new(r, c), Occupant::Piece(p));
        }
        Match::from_board(board)
    }

    fn c(r: i32, col: i32) -> Cell {
        Cell::new(r, col)
    }

    #[test]
    fn simple_move_passes_turn() {
        let mut m = Match::new();
        let out = m.apply_move(Player::One, c(4, 0), c(5, 0)).unwrap();
        assert_eq!(out.kind, MoveKind::Step);
        assert_eq!(out.jump_lock, None);
        assert_eq!(m.to_move(), Player::Two);
        assert_eq!(m.board().occupant(c(5, 0)), Occupant::Piece(Player::One));
        assert!(m.board().is_empty(c(4, 0)));
    }

    #[test]
    fn out_of_turn_is_rejected_without_change() {
        let mut m = Match::new();
        let before = m.clone();
        let err = m.apply_move(Player::Two, c(11, 15), c(10, 15)).unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
        assert_eq!(m, before);
    }

    #[test]
    fn off_board_coordinates_rejected() {
        let mut m = Match::new();
        assert_eq!(
            m.apply_move(Player::One, c(4, 0), c(4, -1)),
            Err(GameError::OffBoard(c(4, -1)))
        );
        assert_eq!(
            m.apply_move(Player::One, c(16, 0), c(5, 0)),
            Err(GameError::OffBoard(c(16, 0)))
        );
    }

    #[test]
    fn moving_opponent_piece_rejected() {
        let mut m = Match::new();
        assert_eq!(
            m.apply_move(Player::One, c(11, 15), c(10, 15)),
            Err(GameError::NotYourPiece(c(11, 15)))
        );
        assert_eq!(
            m.apply_move(Player::One, c(8, 8), c(8, 9)),
            Err(GameError::NotYourPiece(c(8, 8)))
        );
    }

    #[test]
    fn unreachable_destination_rejected() {
        let mut m = Match::new();
        assert_eq!(
            m.apply_move(Player::One, c(4, 0), c(8, 0)),
            Err(GameError::IllegalDestination)
        );
    }

    #[test]
    fn hop_locks_while_hops_remain() {
        let mut m = match_with(&[(0, 0, Player::One), (0, 1, Player::Two), (15, 15, Player::Two)]);
        let out = m.apply_move(Player::One, c(0, 0), c(0, 2)).unwrap();
        assert_eq!(out.kind, MoveKind::Hop);
        // The vacated start square is reachable again by hopping back.
        assert_eq!(out.jump_lock, Some(JumpLock { player: Player::One, cell: c(0, 2) }));
        assert_eq!(m.to_move(), Player::One);
    }

    #[test]
    fn locked_player_must_use_same_piece() {
        let mut m = match_with(&[
            (0, 0, Player::One),
            (0, 1, Player::Two),
            (9, 9, Player::One),
        ]);
        m.apply_move(Player::One, c(0, 0), c(0, 2)).unwrap();
        let before = m.clone();
        assert_eq!(
            m.apply_move(Player::One, c(9, 9), c(9, 10)),
            Err(GameError::MustContinueJump)
        );
        assert_eq!(m, before);
    }

    #[test]
    fn locked_player_cannot_step() {
        let mut m = match_with(&[(0, 0, Player::One), (0, 1, Player::Two)]);
        m.apply_move(Player::One, c(0, 0), c(0, 2)).unwrap();
        assert_eq!(
            m.apply_move(Player::One, c(0, 2), c(1, 2)),
            Err(GameError::JumpOnly)
        );
        assert!(m.turn().is_locked());
    }

    #[test]
    fn chained_hop_then_end_jump() {
        let mut m = match_with(&[
            (0, 0, Player::One),
            (0, 1, Player::Two),
            (0, 3, Player::Two),
        ]);
        m.apply_move(Player::One, c(0, 0), c(0, 2)).unwrap();
        let out = m.apply_move(Player::One, c(0, 2), c(0, 4)).unwrap();
        assert_eq!(out.jump_lock, Some(JumpLock { player: Player::One, cell: c(0, 4) }));

        assert_eq!(m.end_jump(Player::Two), Err(GameError::NoJumpChain));
        m.end_jump(Player::One).unwrap();
        assert_eq!(m.to_move(), Player::Two);
        assert_eq!(m.jump_lock(), None);
    }

    #[test]
    fn end_jump_without_chain_is_error() {
        let mut m = Match::new();
        assert_eq!(m.end_jump(Player::One), Err(GameError::NoJumpChain));
    }

    #[test]
    fn completing_goal_wins() {
        let mut board = Board::empty();
        let goal = board.goal_region(Player::One);
        let last = goal[goal.len() - 1];
        for cell in &goal[..goal.len() - 1] {
            board.place(*cell, Occupant::Piece(Player::One));
        }
        // Step into the final goal cell from outside the camp.
        let outside = c(10, 10);
        assert_eq!(last, c(11, 15));
        board.place(c(10, 14), Occupant::Piece(Player::One));
        board.place(outside, Occupant::Piece(Player::Two));
        let mut m = Match::from_board(board);

        let out = m.apply_move(Player::One, c(10, 14), last).unwrap();
        assert_eq!(out.winner, Some(Player::One));
        assert_eq!(m.winner(), Some(Player::One));
        assert_eq!(m.jump_lock(), None);
        assert_eq!(
            m.apply_move(Player::Two, outside, c(9, 9)),
            Err(GameError::MatchOver)
        );
    }

    #[test]
    fn blocked_goal_cannot_be_won() {
        let mut board = Board::empty();
        for cell in board.goal_region(Player::One) {
            board.block(cell);
        }
        board.place(c(7, 7), Occupant::Piece(Player::One));
        let mut m = Match::from_board(board);
        let out = m.apply_move(Player::One, c(7, 7), c(7, 8)).unwrap();
        assert_eq!(out.winner, None);
        assert!(!m.is_over());
        assert_eq!(m.to_move(), Player::Two);
    }

    #[test]
    fn release_lock_passes_turn_only_for_holder() {
        let mut m = match_with(&[(0, 0, Player::One), (0, 1, Player::Two)]);
        assert!(!m.release_lock(Player::One));
        m.apply_move(Player::One, c(0, 0), c(0, 2)).unwrap();
        assert!(!m.release_lock(Player::Two));
        assert!(m.release_lock(Player::One));
        assert_eq!(m.to_move(), Player::Two);
        assert_eq!(m.jump_lock(), None);
    }

    #[test]
    fn resign_awards_opponent() {
        let mut m = Match::new();
        m.resign(Player::One).unwrap();
        assert_eq!(m.winner(), Some(Player::Two));
        assert_eq!(m.resign(Player::Two), Err(GameError::AlreadyOver));
        assert_eq!(
            m.apply_move(Player::One, c(4, 0), c(5, 0)),
            Err(GameError::MatchOver)
        );
        assert_eq!(m.end_jump(Player::One), Err(GameError::MatchOver));
        m.post_chat(ChatAuthor::Player(Player::One), "gg");
        assert_eq!(m.chat().last().map(|e| e.text.as_str()), Some("gg"));
    }

    #[test]
    fn resign_during_chain_clears_lock() {
        let mut m = match_with(&[(0, 0, Player::One), (0, 1, Player::Two)]);
        m.apply_move(Player::One, c(0, 0), c(0, 2)).unwrap();
        m.resign(Player::One).unwrap();
        assert_eq!(m.jump_lock(), None);
    }

    #[test]
    fn single_vote_only_records() {
        let mut m = Match::new();
        assert_eq!(m.vote_reset(Player::One), ResetVote::Recorded);
        assert_eq!(m.vote_reset(Player::One), ResetVote::AlreadyPending);
        assert!(m.reset_votes().has_voted(Player::One));
        assert!(!m.reset_votes().both());
    }

    #[test]
    fn both_votes_agree_and_restart_clears() {
        let mut m = Match::new();
        m.apply_move(Player::One, c(4, 0), c(5, 0)).unwrap();
        m.post_chat(ChatAuthor::Player(Player::Two), "again?");
        assert_eq!(m.vote_reset(Player::One), ResetVote::Recorded);
        assert_eq!(m.vote_reset(Player::Two), ResetVote::Agreed);
        let chat_before = m.chat().len();

        m.restart();
        assert_eq!(m.board(), &Board::standard());
        assert_eq!(m.reset_votes(), ResetVotes::default());
        assert_eq!(m.to_move(), Player::One);
        assert_eq!(m.chat().len(), chat_before + 1);
        assert!(m.chat().entries().iter().any(|e| e.text == "again?"));
    }

    #[test]
    fn accepted_move_clears_votes() {
        let mut m = Match::new();
        m.vote_reset(Player::Two);
        let out = m.apply_move(Player::One, c(4, 0), c(5, 0)).unwrap();
        assert!(out.votes_cleared);
        assert!(!m.reset_votes().any());
    }

    #[test]
    fn rejected_move_keeps_votes() {
        let mut m = Match::new();
        m.vote_reset(Player::Two);
        assert!(m.apply_move(Player::One, c(4, 0), c(9, 0)).is_err());
        assert!(m.reset_votes().has_voted(Player::Two));
    }

    #[test]
    fn piece_counts_are_conserved() {
        let mut m = Match::new();
        m.apply_move(Player::One, c(2, 1), c(4, 1)).unwrap();
        m.end_jump(Player::One).ok();
        assert_eq!(m.board().piece_count(Player::One), CAMP_SIZE);
        assert_eq!(m.board().piece_count(Player::Two), CAMP_SIZE);
    }
}
