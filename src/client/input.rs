// src/client/input.rs

//! The input sink: serializes presentation-layer key events onto the socket.
//!
//! Writes are fire-and-forget from the session's point of view: a failed
//! write loses that one input event but never tears the session down. The
//! read path is the authority on connection death.

use super::connection::{ConnectionShared, ConnectionState};
use crate::core::GridwireError;
use crate::core::snapshot::InputEvent;
use futures::SinkExt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Accepts input events from the presentation thread and writes them to the
/// socket. Safe to use concurrently with the event loop: the write half is
/// split from the read half and serialized behind its own lock.
#[derive(Debug, Clone)]
pub struct InputSink {
    shared: Arc<ConnectionShared>,
}

impl InputSink {
    pub(crate) fn new(shared: Arc<ConnectionShared>) -> Self {
        Self { shared }
    }

    /// Encodes the key name and writes it to the socket, flushing before
    /// returning so short writes are completed rather than silently lost.
    /// Errors are non-fatal to the session: logged and returned to the
    /// caller, connection state untouched.
    pub async fn send(&self, event: InputEvent) -> Result<(), GridwireError> {
        let mut guard = self.shared.writer().lock().await;
        let Some(writer) = guard.as_mut() else {
            return match self.shared.state() {
                ConnectionState::Failed => Err(GridwireError::Write(format!(
                    "input event {:?} not sent: connection has failed",
                    event.key()
                ))),
                state => Err(GridwireError::InvalidState(format!(
                    "send with connection in state {state:?}"
                ))),
            };
        };

        debug!("Sending input event {:?}", event.key());
        if let Err(e) = writer.send(event.clone()).await {
            warn!("Failed to write input event {:?}: {}", event.key(), e);
            return Err(GridwireError::Write(e.to_string()));
        }
        Ok(())
    }
}
