//! Halma game server library.
//!
//! Exposes the board model, move generation, the match controller, the
//! session manager and the wire protocol for use by the server binary and
//! integration tests.

pub mod board;
pub mod config;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod server;
pub mod session;
