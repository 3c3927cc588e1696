//! Wire protocol.
//!
//! Message types for both directions and the newline-delimited JSON codec
//! used by the transport.

pub mod message;
pub mod parser;

pub use message::{ClientMessage, ServerMessage, SlotFlags, Snapshot};
pub use parser::{decode_line, encode_line, parse_message, ProtocolError};
