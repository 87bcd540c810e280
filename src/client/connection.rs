// src/client/connection.rs

//! Socket lifecycle: the connection state machine, and the shared handle
//! through which the input sink reaches the write endpoint.

use crate::core::GridwireError;
use crate::core::protocol::SnapshotFrameCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::FramedWrite;
use tracing::{debug, info};

/// The write endpoint shared with the input sink. Framed so input events go
/// through the same codec as the rest of the wire protocol.
pub(crate) type InputWriter = FramedWrite<OwnedWriteHalf, SnapshotFrameCodec>;

/// The lifecycle states of the one connection this client maintains.
/// `Failed` is terminal for a connection instance; there is no automatic
/// reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Failed = 3,
}

impl ConnectionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ConnectionState::Disconnected,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Failed,
        }
    }
}

/// The part of a connection that outlives the event loop's exclusive
/// ownership: the state flag and the write endpoint. `state` is an atomic so
/// `is_connected` stays a pure query callable from the presentation thread
/// while the event loop runs.
#[derive(Debug)]
pub struct ConnectionShared {
    state: AtomicU8,
    writer: Mutex<Option<InputWriter>>,
}

impl ConnectionShared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
            writer: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Moves `from` → `to` if and only if the connection is currently in
    /// `from`. Returns whether the transition happened, so a spurious second
    /// connect-completion is a no-op.
    fn try_transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Terminal transition into `Failed`. Idempotent: returns true only for
    /// the first caller. Takes the write endpoint so subsequent sends fail
    /// fast instead of writing into a dead socket.
    pub(crate) async fn fail(&self) -> bool {
        let prev = self.state.swap(ConnectionState::Failed as u8, Ordering::AcqRel);
        let first = prev != ConnectionState::Failed as u8;
        if first {
            self.writer.lock().await.take();
        }
        first
    }

    /// Orderly teardown on shutdown. Unlike `fail`, this is not an error
    /// transition; the connection simply ceases to exist.
    pub(crate) async fn close(&self) {
        self.state
            .store(ConnectionState::Disconnected as u8, Ordering::Release);
        self.writer.lock().await.take();
    }

    pub(crate) fn writer(&self) -> &Mutex<Option<InputWriter>> {
        &self.writer
    }
}

/// Exclusive owner of the socket's read half. Created by `connect`, consumed
/// by the event loop at construction.
#[derive(Debug)]
pub struct Connection {
    pub(crate) reader: OwnedReadHalf,
    pub(crate) shared: Arc<ConnectionShared>,
    pub(crate) peer: SocketAddr,
}

impl Connection {
    /// Establishes the TCP connection and wires up the shared handle.
    /// Fails with `GridwireError::Connect` if the address is malformed or
    /// unreachable.
    pub async fn connect(host: &str, port: u16) -> Result<Self, GridwireError> {
        let shared = Arc::new(ConnectionShared::new());
        let addr = format!("{host}:{port}");

        shared.try_transition(ConnectionState::Disconnected, ConnectionState::Connecting);
        debug!("Connecting to game server at {addr}");

        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| GridwireError::Connect(format!("failed to connect to {addr}: {e}")))?;
        let peer = stream
            .peer_addr()
            .map_err(|e| GridwireError::Connect(format!("no peer address for {addr}: {e}")))?;

        let (reader, writer) = stream.into_split();
        *shared.writer.lock().await = Some(FramedWrite::new(writer, SnapshotFrameCodec::default()));

        // Connect completion is observed exactly once.
        if shared.try_transition(ConnectionState::Connecting, ConnectionState::Connected) {
            info!("Connected to game server at {peer}");
        }

        Ok(Self {
            reader,
            shared,
            peer,
        })
    }

    pub fn shared(&self) -> Arc<ConnectionShared> {
        Arc::clone(&self.shared)
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }
}

/// Helper function to check for non-critical disconnection errors.
pub(crate) fn is_normal_disconnect(e: &GridwireError) -> bool {
    matches!(e, GridwireError::Io(arc_err) if matches!(
        arc_err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    ))
}
