// src/client/mod.rs

//! The client engine: connection lifecycle, the socket event loop, and the
//! hand-off boundaries to the presentation layer.

// Declare the private sub-modules of the `client` module.
mod channel;
mod connection;
mod event_loop;
mod input;

// Publicly re-export the primary types from the sub-modules.
pub use channel::{DEFAULT_SNAPSHOT_CAPACITY, SnapshotReceiver, SnapshotSender, channel};
pub use connection::{Connection, ConnectionShared, ConnectionState};
pub use event_loop::EventLoop;
pub use input::InputSink;

use crate::config::Config;
use crate::core::GridwireError;
use crate::core::snapshot::InputEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::warn;

/// The assembled client: one connection, one event loop, and the two
/// boundaries the presentation layer talks to (the snapshot receiver and the
/// input sink).
#[derive(Debug)]
pub struct GameClient {
    shared: Arc<ConnectionShared>,
    input: InputSink,
    shutdown_tx: broadcast::Sender<()>,
    event_loop: JoinHandle<()>,
}

impl GameClient {
    /// Connects to the configured server, spawns the event loop, and returns
    /// the client handle together with the receiving end of the snapshot
    /// channel. Connect failure at startup is fatal to the client; there is
    /// no reconnection loop.
    pub async fn connect(config: &Config) -> Result<(Self, SnapshotReceiver), GridwireError> {
        let conn = Connection::connect(&config.host, config.port).await?;
        let shared = conn.shared();

        let (snapshot_tx, snapshot_rx) = channel(config.channel.snapshot_capacity);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let event_loop = EventLoop::new(conn, snapshot_tx, shutdown_rx, &config.limits);
        let handle = tokio::spawn(event_loop.run());

        let client = Self {
            input: InputSink::new(Arc::clone(&shared)),
            shared,
            shutdown_tx,
            event_loop: handle,
        };
        Ok((client, snapshot_rx))
    }

    /// Pure query; safe from any thread while the event loop runs.
    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Sends one input event. See [`InputSink::send`] for the error contract.
    pub async fn send(&self, event: InputEvent) -> Result<(), GridwireError> {
        self.input.send(event).await
    }

    /// A cloneable handle to the input sink, for presentation code that owns
    /// its own input loop.
    pub fn input(&self) -> InputSink {
        self.input.clone()
    }

    /// Signals the event loop to stop and waits for it to exit.
    pub async fn shutdown(self) {
        // The loop may already have exited on its own (peer close, error);
        // a dead receiver is fine here.
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.event_loop.await {
            warn!("Event loop task did not exit cleanly: {e}");
        }
    }
}
