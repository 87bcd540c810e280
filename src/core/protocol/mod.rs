// src/core/protocol/mod.rs

pub mod snapshot_frame;

pub use snapshot_frame::{DEFAULT_MAX_SNAPSHOT_SIZE, SnapshotFrameCodec};
