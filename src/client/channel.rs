// src/client/channel.rs

//! The hand-off boundary between the event loop and the presentation layer:
//! a bounded, drop-oldest, single-producer single-consumer snapshot queue.
//!
//! Snapshots supersede one another (only the latest matters for rendering),
//! so when the consumer cannot keep up the oldest queued snapshot is the
//! right one to sacrifice. The producer never blocks.

use crate::core::snapshot::Snapshot;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;
use tracing::debug;

/// Default queue depth. The queue only absorbs presentation-side jitter;
/// it does not need to hold history.
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 16;

#[derive(Debug)]
struct Shared {
    queue: Mutex<VecDeque<Snapshot>>,
    notify: Notify,
    capacity: usize,
    closed: AtomicBool,
    dropped: AtomicU64,
}

/// Creates a bounded snapshot channel. `capacity` must be at least 1.
pub fn channel(capacity: usize) -> (SnapshotSender, SnapshotReceiver) {
    assert!(capacity > 0, "snapshot channel capacity must be at least 1");
    let shared = Arc::new(Shared {
        queue: Mutex::new(VecDeque::with_capacity(capacity)),
        notify: Notify::new(),
        capacity,
        closed: AtomicBool::new(false),
        dropped: AtomicU64::new(0),
    });
    (
        SnapshotSender {
            shared: Arc::clone(&shared),
        },
        SnapshotReceiver { shared },
    )
}

/// The producing end, owned by the event loop.
#[derive(Debug)]
pub struct SnapshotSender {
    shared: Arc<Shared>,
}

impl SnapshotSender {
    /// Enqueues a snapshot without ever blocking. On a full queue the oldest
    /// entry is dropped to make room, preserving delivery order of the rest.
    pub fn push(&self, snapshot: Snapshot) {
        {
            let mut queue = self.shared.queue.lock();
            if queue.len() == self.shared.capacity {
                queue.pop_front();
                let dropped = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(dropped, "Snapshot queue full; dropped the oldest snapshot");
            }
            queue.push_back(snapshot);
        }
        self.shared.notify.notify_one();
    }
}

impl Drop for SnapshotSender {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }
}

/// The consuming end, handed to the presentation layer.
#[derive(Debug)]
pub struct SnapshotReceiver {
    shared: Arc<Shared>,
}

impl SnapshotReceiver {
    /// Receives the next snapshot in decode order, waiting if the queue is
    /// empty. Returns `None` once the producer is gone and the queue has
    /// been drained.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        loop {
            if let Some(snapshot) = self.shared.queue.lock().pop_front() {
                return Some(snapshot);
            }
            if self.shared.closed.load(Ordering::Acquire) {
                return None;
            }
            // `notify_one` stores a permit when nobody is waiting, so a push
            // racing this await is not lost.
            self.shared.notify.notified().await;
        }
    }

    /// Non-blocking variant for presentation loops that tick on their own
    /// scheduler.
    pub fn try_recv(&mut self) -> Option<Snapshot> {
        self.shared.queue.lock().pop_front()
    }

    /// Whether the producing end has hung up. Queued snapshots may still be
    /// pending.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Number of snapshots sacrificed to the drop-oldest policy so far.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}
