// src/core/errors.rs

//! Defines the primary error type for the entire client.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the client.
/// Using `thiserror` allows for clean error definitions and automatic `From` trait implementations.
#[derive(Error, Debug)]
pub enum GridwireError {
    #[error("Connect error: {0}")]
    Connect(String),

    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Snapshot frame of {size} bytes exceeds the limit of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Write error: {0}")]
    Write(String),

    #[error("Operation not allowed in the current connection state: {0}")]
    InvalidState(String),
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
// We wrap it in an Arc to allow for cheap, shared cloning.
impl Clone for GridwireError {
    fn clone(&self) -> Self {
        match self {
            GridwireError::Connect(s) => GridwireError::Connect(s.clone()),
            GridwireError::Io(e) => GridwireError::Io(Arc::clone(e)),
            GridwireError::Decode(s) => GridwireError::Decode(s.clone()),
            GridwireError::Encode(s) => GridwireError::Encode(s.clone()),
            GridwireError::FrameTooLarge { size, max } => GridwireError::FrameTooLarge {
                size: *size,
                max: *max,
            },
            GridwireError::Write(s) => GridwireError::Write(s.clone()),
            GridwireError::InvalidState(s) => GridwireError::InvalidState(s.clone()),
        }
    }
}

impl PartialEq for GridwireError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GridwireError::Io(e1), GridwireError::Io(e2)) => e1.to_string() == e2.to_string(),
            (GridwireError::Connect(s1), GridwireError::Connect(s2)) => s1 == s2,
            (GridwireError::Decode(s1), GridwireError::Decode(s2)) => s1 == s2,
            (GridwireError::Encode(s1), GridwireError::Encode(s2)) => s1 == s2,
            (
                GridwireError::FrameTooLarge { size: s1, max: m1 },
                GridwireError::FrameTooLarge { size: s2, max: m2 },
            ) => s1 == s2 && m1 == m2,
            (GridwireError::Write(s1), GridwireError::Write(s2)) => s1 == s2,
            (GridwireError::InvalidState(s1), GridwireError::InvalidState(s2)) => s1 == s2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for GridwireError {
    fn from(e: std::io::Error) -> Self {
        GridwireError::Io(Arc::new(e))
    }
}

impl From<bincode::error::DecodeError> for GridwireError {
    fn from(e: bincode::error::DecodeError) -> Self {
        GridwireError::Decode(e.to_string())
    }
}

impl From<bincode::error::EncodeError> for GridwireError {
    fn from(e: bincode::error::EncodeError) -> Self {
        GridwireError::Encode(e.to_string())
    }
}
