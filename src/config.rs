//! Server configuration.

use std::time::Duration;

use thiserror::Error;

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 50007;

/// Default interval clients are expected to ping at.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 10;

/// Default number of chat entries carried in each state snapshot.
pub const DEFAULT_MAX_CHAT_HISTORY: usize = 200;

/// Default maximum length of a chat message, in characters.
pub const DEFAULT_MAX_CHAT_LEN: usize = 500;

/// Longest accepted heartbeat interval.
pub const MAX_HEARTBEAT_SECS: u64 = 3600;

/// Missed heartbeats after which a connection is considered gone.
const MISSED_HEARTBEATS: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("heartbeat interval must be positive")]
    ZeroHeartbeat,

    #[error("heartbeat interval must be at most {} seconds", MAX_HEARTBEAT_SECS)]
    HeartbeatTooLong,

    #[error("max chat history must be positive")]
    ZeroChatHistory,

    #[error("max chat length must be positive")]
    ZeroChatLen,
}

/// Limits applied to the chat channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLimits {
    /// Entries included in each snapshot (newest kept).
    pub max_history: usize,
    /// Characters kept from each incoming message.
    pub max_len: usize,
}

impl Default for ChatLimits {
    fn default() -> Self {
        ChatLimits {
            max_history: DEFAULT_MAX_CHAT_HISTORY,
            max_len: DEFAULT_MAX_CHAT_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub heartbeat: Duration,
    pub chat: ChatLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            heartbeat: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            chat: ChatLimits::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat.is_zero() {
            return Err(ConfigError::ZeroHeartbeat);
        }
        if self.heartbeat > Duration::from_secs(MAX_HEARTBEAT_SECS) {
            return Err(ConfigError::HeartbeatTooLong);
        }
        if self.chat.max_history == 0 {
            return Err(ConfigError::ZeroChatHistory);
        }
        if self.chat.max_len == 0 {
            return Err(ConfigError::ZeroChatLen);
        }
        Ok(())
    }

    /// `host:port` string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// How long a connection may stay silent before it is dropped.
    /// Saturates instead of overflowing for unvalidated configs.
    pub fn idle_timeout(&self) -> Duration {
        self.heartbeat
            .checked_mul(MISSED_HEARTBEATS)
            .unwrap_or(Duration::MAX)
    }
}
