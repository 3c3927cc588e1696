//! halma -- authoritative server for two-player Halma with spectators and chat.
//!
//! Listens on TCP and speaks newline-delimited JSON. The first two
//! connections play, everyone after that watches.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use halma::config::{
    ChatLimits, ServerConfig, DEFAULT_HEARTBEAT_SECS, DEFAULT_MAX_CHAT_HISTORY,
    DEFAULT_MAX_CHAT_LEN, DEFAULT_PORT,
};
use halma::server;

/// Command-line arguments. Each can also come from a `HALMA_*` variable.
#[derive(Parser, Debug)]
#[command(name = "halma")]
#[command(about = "Authoritative Halma game server")]
struct Args {
    /// Address to bind.
    #[arg(long, env = "HALMA_HOST", default_value = "0.0.0.0")]
    host: String,

    /// TCP port to listen on.
    #[arg(long, env = "HALMA_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Expected client ping interval; three missed intervals drop the connection.
    #[arg(long, env = "HALMA_HEARTBEAT_SECS", default_value_t = DEFAULT_HEARTBEAT_SECS)]
    heartbeat_secs: u64,

    /// Chat entries included in each state snapshot.
    #[arg(long, env = "HALMA_MAX_CHAT_HISTORY", default_value_t = DEFAULT_MAX_CHAT_HISTORY)]
    max_chat_history: usize,

    /// Characters kept from each chat message.
    #[arg(long, env = "HALMA_MAX_CHAT_LEN", default_value_t = DEFAULT_MAX_CHAT_LEN)]
    max_chat_len: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            heartbeat: Duration::from_secs(self.heartbeat_secs),
            chat: ChatLimits {
                max_history: self.max_chat_history,
                max_len: self.max_chat_len,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();
    config.validate().context("invalid configuration")?;

    tokio::select! {
        res = server::run(config) => res.context("server stopped")?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}
