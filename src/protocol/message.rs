//! Wire messages.
//!
//! Both directions are closed enums tagged by a `"type"` field, so the rest
//! of the server only ever handles strongly typed values.

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Player};
use crate::game::{ChatEntry, JumpLock};

/// A client-to-server message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Move the piece on `src` to `dst`.
    Move { src: Cell, dst: Cell },

    /// Stop the current jump chain and pass the turn.
    #[serde(rename = "endjump")]
    EndJump,

    /// Vote to restart the match.
    Reset,

    /// Concede the match.
    Resign,

    Chat { text: String },

    /// Liveness check; answered with `pong`.
    Ping,
}

impl ClientMessage {
    /// Every `type` tag this enum accepts.
    pub const TYPES: [&'static str; 6] = ["move", "endjump", "reset", "resign", "chat", "ping"];
}

/// One boolean per player slot, serialized as `{"p1": .., "p2": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFlags {
    pub p1: bool,
    pub p2: bool,
}

impl SlotFlags {
    /// Builds the flags by asking `f` about each player in turn.
    pub fn from_fn(mut f: impl FnMut(Player) -> bool) -> Self {
        SlotFlags {
            p1: f(Player::One),
            p2: f(Player::Two),
        }
    }
}

/// The full externally visible state of a match at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Occupancy codes by row: 0 empty, 1 or 2 for a player's piece.
    pub board: Vec<Vec<u8>>,
    pub turn: Player,
    pub winner: Option<Player>,
    pub chat: Vec<ChatEntry>,
    /// Which player slots currently have a connection.
    pub players: SlotFlags,
    pub jump_lock: Option<JumpLock>,
    pub reset_votes: SlotFlags,
}

/// A server-to-client message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Sent once to a new connection; `player` is null for spectators.
    Join { player: Option<Player> },

    State(Snapshot),

    /// A chat line; `player` is null when a spectator wrote it.
    Chat { player: Option<Player>, text: String },

    /// Rejection reason, sent only to the connection that caused it.
    Error { message: String },

    Pong,
}

impl ServerMessage {
    pub fn error(message: impl ToString) -> Self {
        ServerMessage::Error {
            message: message.to_string(),
        }
    }
}
