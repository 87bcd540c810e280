// src/client/event_loop.rs

//! The read side of the client: a dedicated task parked on socket readiness,
//! decoding snapshot frames off the stream and handing them to the snapshot
//! channel.

use super::channel::SnapshotSender;
use super::connection::{Connection, ConnectionShared, is_normal_disconnect};
use crate::config::LimitsConfig;
use crate::core::protocol::SnapshotFrameCodec;
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::broadcast;
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info};

/// The event loop driving the one connection. It suspends only on the
/// readiness of the socket or the shutdown signal; dispatching a decoded
/// frame never blocks on the consumer.
pub struct EventLoop {
    framed: FramedRead<OwnedReadHalf, SnapshotFrameCodec>,
    shared: Arc<ConnectionShared>,
    peer: SocketAddr,
    snapshots: SnapshotSender,
    shutdown_rx: broadcast::Receiver<()>,
}

impl EventLoop {
    pub fn new(
        conn: Connection,
        snapshots: SnapshotSender,
        shutdown_rx: broadcast::Receiver<()>,
        limits: &LimitsConfig,
    ) -> Self {
        let Connection {
            reader,
            shared,
            peer,
        } = conn;
        let framed = FramedRead::with_capacity(
            reader,
            SnapshotFrameCodec::new(limits.max_snapshot_size),
            limits.read_buffer_size,
        );
        Self {
            framed,
            shared,
            peer,
            snapshots,
            shutdown_rx,
        }
    }

    /// Runs until shutdown, peer close, or a fatal error. Fail-fast: any
    /// error from a dispatch step fails the connection and exits the loop
    /// rather than retrying.
    pub async fn run(mut self) {
        debug!("Event loop started for {}", self.peer);
        loop {
            tokio::select! {
                // Prioritize the shutdown signal over pending reads.
                biased;
                _ = self.shutdown_rx.recv() => {
                    info!("Event loop for {} received shutdown signal.", self.peer);
                    self.shared.close().await;
                    break;
                }
                result = self.framed.next() => {
                    match result {
                        Some(Ok(snapshot)) => {
                            debug!(phase = %snapshot.phase, "Decoded snapshot from {}", self.peer);
                            self.snapshots.push(snapshot);
                        }
                        Some(Err(e)) => {
                            if is_normal_disconnect(&e) {
                                debug!("Connection to {} closed by peer: {}", self.peer, e);
                            } else {
                                error!("Fatal connection error for {}: {}", self.peer, e);
                            }
                            self.shared.fail().await;
                            break;
                        }
                        None => {
                            // End-of-stream. Not a decodable condition: the
                            // connection fails and no further snapshots are
                            // emitted.
                            info!("Server at {} closed the connection.", self.peer);
                            self.shared.fail().await;
                            break;
                        }
                    }
                }
            }
        }
        debug!("Event loop for {} exited.", self.peer);
        // Dropping `self.snapshots` here closes the channel; the consumer
        // drains what was decoded and then observes the end of the stream.
    }
}
