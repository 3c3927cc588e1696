//! TCP transport.
//!
//! Every connection gets a reader loop and a writer task. Readers decode
//! lines into `ClientMessage`s and forward them to the hub, a single task
//! that owns the `Session` and every connection's outbox. Because only the
//! hub touches the session, operations apply one at a time in arrival order.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::protocol::{decode_line, encode_line, ClientMessage, ProtocolError, ServerMessage};
use crate::session::{ConnectionId, Outbound, Session};

/// Longest accepted input line, excluding the newline.
pub const MAX_LINE_LEN: usize = 16 * 1024;

/// Messages queued per connection before it counts as stalled and is dropped.
pub const OUTBOX_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session hub has shut down")]
    HubClosed,
}

type Outbox = mpsc::Sender<ServerMessage>;

/// Events consumed by the hub, in arrival order.
enum HubEvent {
    Connected {
        outbox: Outbox,
        reply: oneshot::Sender<ConnectionId>,
    },
    Message {
        conn: ConnectionId,
        msg: ClientMessage,
    },
    /// A line from `conn` could not be decoded.
    Rejected {
        conn: ConnectionId,
        error: ProtocolError,
    },
    Disconnected {
        conn: ConnectionId,
    },
}

/// Owns the session and routes its output to connection outboxes.
struct Hub {
    session: Session,
    outboxes: BTreeMap<ConnectionId, Outbox>,
}

impl Hub {
    fn new(session: Session) -> Self {
        Hub {
            session,
            outboxes: BTreeMap::new(),
        }
    }

    fn on_event(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected { outbox, reply } => {
                let (conn, _, out) = self.session.join();
                self.outboxes.insert(conn, outbox);
                if reply.send(conn).is_err() {
                    // The connection task is already gone.
                    self.disconnect(conn);
                    return;
                }
                self.deliver(out);
            }
            HubEvent::Message { conn, msg } => {
                // Events can still arrive from a connection the hub dropped.
                if !self.outboxes.contains_key(&conn) {
                    return;
                }
                let out = self.session.handle(conn, msg);
                self.deliver(out);
            }
            HubEvent::Rejected { conn, error } => {
                warn!(%conn, error = %error, "undecodable message");
                self.deliver(vec![Outbound::To(conn, ServerMessage::error(&error))]);
            }
            HubEvent::Disconnected { conn } => self.disconnect(conn),
        }
    }

    /// Removes the outbox of `conn` and lets the session know it left.
    /// Dropping the outbox ends the connection's writer.
    fn disconnect(&mut self, conn: ConnectionId) {
        self.outboxes.remove(&conn);
        let out = self.session.leave(conn);
        self.deliver(out);
    }

    fn deliver(&mut self, out: Vec<Outbound>) {
        let mut stalled = Vec::new();
        for item in out {
            match item {
                Outbound::To(conn, msg) => {
                    if let Some(outbox) = self.outboxes.get(&conn) {
                        if is_full(outbox.try_send(msg)) {
                            stalled.push(conn);
                        }
                    }
                }
                Outbound::Broadcast(msg) => {
                    for (conn, outbox) in &self.outboxes {
                        if is_full(outbox.try_send(msg.clone())) {
                            stalled.push(*conn);
                        }
                    }
                }
            }
        }

        stalled.sort();
        stalled.dedup();
        for conn in stalled {
            if self.outboxes.contains_key(&conn) {
                warn!(%conn, capacity = OUTBOX_CAPACITY, "outbox full, dropping connection");
                self.disconnect(conn);
            }
        }
    }
}

/// A closed outbox is not an error here: its reader reports the disconnect.
fn is_full(result: Result<(), TrySendError<ServerMessage>>) -> bool {
    matches!(result, Err(TrySendError::Full(_)))
}

async fn run_hub(session: Session, mut events: mpsc::UnboundedReceiver<HubEvent>) {
    let mut hub = Hub::new(session);
    while let Some(event) = events.recv().await {
        hub.on_event(event);
    }
    debug!("hub stopped");
}

/// Accepts connections on `listener` and serves a single session until an
/// accept error occurs.
pub async fn serve(listener: TcpListener, config: ServerConfig) -> Result<(), ServerError> {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_hub(Session::new(config.chat), events_rx));

    let idle = config.idle_timeout();
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!(%addr, "accepted connection");
        let events = events_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, events, idle).await {
                warn!(%addr, error = %e, "connection ended with error");
            }
        });
    }
}

/// Binds the configured address and serves on it.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(addr = %listener.local_addr()?, "listening");
    serve(listener, config).await
}

async fn handle_connection(
    stream: TcpStream,
    events: mpsc::UnboundedSender<HubEvent>,
    idle: Duration,
) -> Result<(), ServerError> {
    let (reader, writer) = stream.into_split();
    let (outbox, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);
    let (reply_tx, reply_rx) = oneshot::channel();

    events
        .send(HubEvent::Connected {
            outbox,
            reply: reply_tx,
        })
        .map_err(|_| ServerError::HubClosed)?;
    let conn = reply_rx.await.map_err(|_| ServerError::HubClosed)?;

    let mut writer_task = tokio::spawn(write_loop(conn, writer, outbox_rx));

    // The writer stops on its own when the hub drops the outbox or the peer
    // stops accepting data; either way there is no one left to read for.
    let result = tokio::select! {
        res = read_loop(conn, reader, &events, idle) => res,
        _ = &mut writer_task => {
            debug!(%conn, "writer closed, stopping reader");
            let _ = events.send(HubEvent::Disconnected { conn });
            return Ok(());
        }
    };

    let _ = events.send(HubEvent::Disconnected { conn });
    let _ = writer_task.await;
    result
}

async fn read_loop(
    conn: ConnectionId,
    reader: OwnedReadHalf,
    events: &mpsc::UnboundedSender<HubEvent>,
    idle: Duration,
) -> Result<(), ServerError> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        let read = match timeout(idle, read_line_capped(&mut reader, &mut buf, MAX_LINE_LEN)).await
        {
            Err(_) => {
                info!(%conn, "no traffic within {:?}, dropping", idle);
                return Ok(());
            }
            Ok(res) => res?,
        };

        let event = match read {
            LineRead::Eof => return Ok(()),
            LineRead::TooLong => HubEvent::Rejected {
                conn,
                error: ProtocolError::LineTooLong { limit: MAX_LINE_LEN },
            },
            LineRead::Line => match decode_line(&buf) {
                Ok(None) => continue,
                Ok(Some(msg)) => HubEvent::Message { conn, msg },
                Err(error) => HubEvent::Rejected { conn, error },
            },
        };
        events.send(event).map_err(|_| ServerError::HubClosed)?;
    }
}

/// Outcome of reading one newline-terminated line.
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    /// `buf` holds the line without its newline.
    Line,
    /// The line was longer than the limit and has been skipped.
    TooLong,
    Eof,
}

/// Reads one line into `buf`, holding at most `max + 1` bytes in memory.
///
/// An oversized line is consumed up to and including its newline and
/// reported as `TooLong`, so the next call starts on a fresh line.
async fn read_line_capped<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let limit = max as u64 + 1;
    buf.clear();
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
    if n == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        return Ok(LineRead::Line);
    }
    if buf.len() <= max {
        // Last line before EOF, without a newline.
        return Ok(LineRead::Line);
    }

    loop {
        buf.clear();
        let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
        if n == 0 || buf.last() == Some(&b'\n') {
            break;
        }
    }
    buf.clear();
    Ok(LineRead::TooLong)
}

async fn write_loop(
    conn: ConnectionId,
    mut writer: OwnedWriteHalf,
    mut outbox: mpsc::Receiver<ServerMessage>,
) {
    while let Some(msg) = outbox.recv().await {
        let mut line = match encode_line(&msg) {
            Ok(line) => line,
            Err(e) => {
                warn!(%conn, error = %e, "dropping unencodable message");
                continue;
            }
        };
        line.push('\n');
        if writer.write_all(line.as_bytes()).await.is_err() {
            break;
        }
    }
    let _ = writer.shutdown().await;
}
