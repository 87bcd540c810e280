// src/core/protocol/snapshot_frame.rs

//! Implements the snapshot wire frame and the corresponding `Encoder` and
//! `Decoder` for the server's snapshot stream.
//!
//! Inbound, each logical message is one frame: a `u32` big-endian length
//! prefix followed by a bincode-encoded `Snapshot` payload. A frame may span
//! several socket reads; the decoder accumulates bytes until the frame is
//! complete, bounded by a maximum snapshot size. Outbound input events are
//! the raw bytes of the key name, unframed, per the server's wire contract.

use crate::core::GridwireError;
use crate::core::snapshot::{InputEvent, Snapshot};
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Length of the frame header carrying the payload size.
const LEN_PREFIX: usize = 4;

/// Default upper bound for a single encoded snapshot. Guards the accumulation
/// buffer against a corrupt or hostile length prefix.
pub const DEFAULT_MAX_SNAPSHOT_SIZE: usize = 256 * 1024;

impl Snapshot {
    /// A convenience method to encode a snapshot into a framed `Vec<u8>`.
    /// Useful for test fixtures and server-side tooling.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, GridwireError> {
        let mut buf = BytesMut::new();
        SnapshotFrameCodec::default().encode(self, &mut buf)?;
        Ok(buf.to_vec())
    }
}

/// A `tokio_util::codec` implementation for the snapshot stream.
#[derive(Debug)]
pub struct SnapshotFrameCodec {
    max_snapshot_size: usize,
}

impl SnapshotFrameCodec {
    pub fn new(max_snapshot_size: usize) -> Self {
        Self { max_snapshot_size }
    }
}

impl Default for SnapshotFrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SNAPSHOT_SIZE)
    }
}

impl Decoder for SnapshotFrameCodec {
    type Item = Snapshot;
    type Error = GridwireError;

    /// Decodes zero or one snapshot from the accumulation buffer. Returning
    /// `Ok(None)` signals that more data is needed; no bytes are consumed
    /// until a full frame is present, so nothing is ever decoded twice.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LEN_PREFIX {
            return Ok(None);
        }

        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&src[..LEN_PREFIX]);
        let payload_len = u32::from_be_bytes(len_bytes) as usize;

        if payload_len > self.max_snapshot_size {
            return Err(GridwireError::FrameTooLarge {
                size: payload_len,
                max: self.max_snapshot_size,
            });
        }

        if src.len() < LEN_PREFIX + payload_len {
            // A partial frame spanning reads. Reserve the remainder so the
            // next read lands in one allocation.
            src.reserve(LEN_PREFIX + payload_len - src.len());
            return Ok(None);
        }

        src.advance(LEN_PREFIX);
        let payload = src.split_to(payload_len);

        let (snapshot, consumed) =
            bincode::decode_from_slice::<Snapshot, _>(&payload[..], bincode::config::standard())?;
        if consumed != payload_len {
            return Err(GridwireError::Decode(format!(
                "frame declared {payload_len} payload bytes but the snapshot occupies {consumed}"
            )));
        }
        Ok(Some(snapshot))
    }
}

impl<'a> Encoder<&'a Snapshot> for SnapshotFrameCodec {
    type Error = GridwireError;

    /// Encodes a snapshot as one length-prefixed frame.
    fn encode(&mut self, item: &'a Snapshot, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = bincode::encode_to_vec(item, bincode::config::standard())?;
        if payload.len() > self.max_snapshot_size {
            return Err(GridwireError::FrameTooLarge {
                size: payload.len(),
                max: self.max_snapshot_size,
            });
        }
        dst.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

impl Encoder<InputEvent> for SnapshotFrameCodec {
    type Error = GridwireError;

    /// Encodes an input event as the raw bytes of its key name. No framing,
    /// no length prefix, no acknowledgement.
    fn encode(&mut self, item: InputEvent, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(item.key().as_bytes());
        Ok(())
    }
}
