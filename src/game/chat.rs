//! Append-only chat log shared by players and spectators.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::Player;

/// Who wrote a chat line.
///
/// On the wire: `0` for server notes, `1`/`2` for players, `null` for
/// spectators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatAuthor {
    System,
    Spectator,
    Player(Player),
}

impl Serialize for ChatAuthor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChatAuthor::System => serializer.serialize_u8(0),
            ChatAuthor::Spectator => serializer.serialize_none(),
            ChatAuthor::Player(p) => serializer.serialize_u8(p.number()),
        }
    }
}

impl<'de> Deserialize<'de> for ChatAuthor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<u8>::deserialize(deserializer)? {
            None => Ok(ChatAuthor::Spectator),
            Some(0) => Ok(ChatAuthor::System),
            Some(n) => Player::from_number(n)
                .map(ChatAuthor::Player)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid chat author {}", n))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    #[serde(rename = "player")]
    pub author: ChatAuthor,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    pub fn push(&mut self, author: ChatAuthor, text: impl Into<String>) {
        self.entries.push(ChatEntry {
            author,
            text: text.into(),
        });
    }

    /// Appends a server note.
    pub fn note(&mut self, text: impl Into<String>) {
        self.push(ChatAuthor::System, text);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// The newest `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> &[ChatEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }
}
