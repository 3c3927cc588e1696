//! Session: connections, roles, and the current match.
//!
//! The session assigns each connection a role when it joins, resolves which
//! player (if any) an incoming message acts for, forwards the action to the
//! match, and decides which connections hear about the result. It holds no
//! sockets; the transport owns those and delivers the returned `Outbound`
//! messages. All mutation goes through `&mut self`, so the caller provides the
//! single-writer boundary.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::board::{Cell, Player};
use crate::config::ChatLimits;
use crate::game::{ChatAuthor, GameError, Match, MoveOutcome, ResetVote};
use crate::protocol::{ClientMessage, ServerMessage, SlotFlags, Snapshot};

/// Identifies one connection for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// What a connection is allowed to do. Fixed when the connection joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player(Player),
    Spectator,
}

impl Role {
    pub fn player(self) -> Option<Player> {
        match self {
            Role::Player(p) => Some(p),
            Role::Spectator => None,
        }
    }
}

/// A message the transport must deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Deliver to one connection only.
    To(ConnectionId, ServerMessage),
    /// Deliver to every connection.
    Broadcast(ServerMessage),
}

pub struct Session {
    game: Match,
    roles: BTreeMap<ConnectionId, Role>,
    slots: [Option<ConnectionId>; 2],
    next_id: u64,
    limits: ChatLimits,
}

impl Session {
    /// Creates a session with a fresh match and no connections.
    pub fn new(limits: ChatLimits) -> Self {
        Session::with_match(Match::new(), limits)
    }

    /// Creates a session around an existing match.
    pub fn with_match(game: Match, limits: ChatLimits) -> Self {
        Session {
            game,
            roles: BTreeMap::new(),
            slots: [None; 2],
            next_id: 1,
            limits,
        }
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn role(&self, conn: ConnectionId) -> Option<Role> {
        self.roles.get(&conn).copied()
    }

    /// Number of connections currently joined, players and spectators alike.
    pub fn connection_count(&self) -> usize {
        self.roles.len()
    }

    pub fn is_online(&self, player: Player) -> bool {
        self.slots[player.slot()].is_some()
    }

    /// Registers a new connection and assigns it the first free player slot,
    /// or a spectator role when both slots are taken.
    pub fn join(&mut self) -> (ConnectionId, Role, Vec<Outbound>) {
        let conn = ConnectionId(self.next_id);
        self.next_id += 1;

        let role = match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(conn);
                Role::Player([Player::One, Player::Two][idx])
            }
            None => Role::Spectator,
        };
        self.roles.insert(conn, role);
        info!(%conn, ?role, "connection joined");

        let out = vec![
            Outbound::To(conn, ServerMessage::Join { player: role.player() }),
            Outbound::Broadcast(self.state()),
        ];
        (conn, role, out)
    }

    /// Removes a connection.
    ///
    /// A departing player frees their slot for the next connection to join,
    /// ends any jump chain they hold (passing the turn) and withdraws their
    /// restart vote. The match itself continues.
    pub fn leave(&mut self, conn: ConnectionId) -> Vec<Outbound> {
        let Some(role) = self.roles.remove(&conn) else {
            return Vec::new();
        };
        info!(%conn, ?role, "connection left");

        let Role::Player(player) = role else {
            return Vec::new();
        };
        self.slots[player.slot()] = None;
        if self.game.release_lock(player) {
            debug!(%conn, %player, "jump chain ended by disconnect");
        }
        self.game.withdraw_vote(player);
        self.game.note(format!("Player {} disconnected.", player.number()));

        vec![Outbound::Broadcast(self.state())]
    }

    /// Applies one decoded message from `conn` and returns what to send.
    ///
    /// Accepted state changes broadcast a fresh snapshot. Rejections go to
    /// the sender only: an error event followed by a snapshot so the client
    /// can resynchronise.
    pub fn handle(&mut self, conn: ConnectionId, msg: ClientMessage) -> Vec<Outbound> {
        let result = match msg {
            ClientMessage::Move { src, dst } => self.apply_move(conn, src, dst).map(drop),
            ClientMessage::EndJump => self.end_jump(conn),
            ClientMessage::Resign => self.resign(conn),
            ClientMessage::Reset => self.request_reset(conn).map(drop),
            ClientMessage::Chat { text } => {
                return vec![Outbound::Broadcast(self.chat(conn, &text))];
            }
            ClientMessage::Ping => return vec![Outbound::To(conn, ServerMessage::Pong)],
        };

        match result {
            Ok(()) => vec![Outbound::Broadcast(self.state())],
            Err(err) => {
                warn!(%conn, kind = ?err.kind(), "rejected: {}", err);
                vec![
                    Outbound::To(conn, ServerMessage::error(&err)),
                    Outbound::To(conn, self.state()),
                ]
            }
        }
    }

    pub fn apply_move(
        &mut self,
        conn: ConnectionId,
        src: Cell,
        dst: Cell,
    ) -> Result<MoveOutcome, GameError> {
        let player = self.player_for(conn, "move")?;
        let outcome = self.game.apply_move(player, src, dst)?;
        debug!(%conn, %player, %src, %dst, kind = ?outcome.kind, "move accepted");
        if let Some(winner) = outcome.winner {
            info!(%winner, "match won");
        }
        Ok(outcome)
    }

    pub fn end_jump(&mut self, conn: ConnectionId) -> Result<(), GameError> {
        let player = self.player_for(conn, "end a jump chain")?;
        self.game.end_jump(player)
    }

    pub fn resign(&mut self, conn: ConnectionId) -> Result<(), GameError> {
        let player = self.player_for(conn, "resign")?;
        self.game.resign(player)?;
        info!(%player, "player resigned");
        Ok(())
    }

    /// Records a restart vote and restarts the match once both players agree.
    pub fn request_reset(&mut self, conn: ConnectionId) -> Result<ResetVote, GameError> {
        let player = self.player_for(conn, "request a restart")?;
        let vote = self.game.vote_reset(player);
        if vote == ResetVote::Agreed {
            self.game.restart();
            info!("match restarted by agreement");
        }
        Ok(vote)
    }

    /// Appends a chat line from any connection and returns the broadcast
    /// event for it. Text beyond the configured length is cut off.
    pub fn chat(&mut self, conn: ConnectionId, text: &str) -> ServerMessage {
        let role = self.role(conn).unwrap_or(Role::Spectator);
        let text: String = text.chars().take(self.limits.max_len).collect();
        let author = match role {
            Role::Player(p) => ChatAuthor::Player(p),
            Role::Spectator => ChatAuthor::Spectator,
        };
        self.game.post_chat(author, text.clone());
        ServerMessage::Chat {
            player: role.player(),
            text,
        }
    }

    /// Builds the externally visible state, with the chat log capped to the
    /// newest entries.
    pub fn snapshot(&self) -> Snapshot {
        let votes = self.game.reset_votes();
        Snapshot {
            board: self.game.board().to_grid(),
            turn: self.game.to_move(),
            winner: self.game.winner(),
            chat: self.game.chat().recent(self.limits.max_history).to_vec(),
            players: SlotFlags::from_fn(|p| self.is_online(p)),
            jump_lock: self.game.jump_lock(),
            reset_votes: SlotFlags::from_fn(|p| votes.has_voted(p)),
        }
    }

    fn state(&self) -> ServerMessage {
        ServerMessage::State(self.snapshot())
    }

    fn player_for(&self, conn: ConnectionId, action: &'static str) -> Result<Player, GameError> {
        self.role(conn)
            .and_then(Role::player)
            .ok_or(GameError::SpectatorAction { action })
    }
}
