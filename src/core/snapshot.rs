// src/core/snapshot.rs

//! The core data model: world snapshots received from the server and input
//! events sent back to it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single map tile, as named by the server (e.g. "floor", "wall").
#[derive(Serialize, Deserialize, bincode::Encode, bincode::Decode, Debug, Clone, PartialEq, Eq)]
pub struct TileId(pub String);

impl TileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        TileId(s.to_string())
    }
}

/// The state of one entity (player, monster, item) as reported by the server.
#[derive(Serialize, Deserialize, bincode::Encode, bincode::Decode, Debug, Clone, PartialEq, Eq)]
pub struct EntityState {
    pub id: u32,
    /// Entity kind, as named by the server (e.g. "player", "slime").
    pub kind: String,
    pub x: u16,
    pub y: u16,
}

/// The phase of the game session. A closed set; the presentation layer maps
/// each phase to its own visual treatment.
#[derive(
    Serialize,
    Deserialize,
    bincode::Encode,
    bincode::Decode,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    #[default]
    Playing,
    Win,
    Lose,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            GamePhase::Playing => "playing",
            GamePhase::Win => "win",
            GamePhase::Lose => "lose",
        };
        f.write_str(tag)
    }
}

/// One decoded unit of world state. Immutable once decoded; ownership is
/// handed to the presentation layer through the snapshot channel.
#[derive(Serialize, Deserialize, bincode::Encode, bincode::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The 2-D tile grid, row-major.
    pub tiles: Vec<Vec<TileId>>,
    pub entities: Vec<EntityState>,
    /// Log lines the server wants shown to the player.
    pub messages: Vec<String>,
    /// The status line (hit points, inventory summary, and so on).
    pub status: String,
    pub phase: GamePhase,
}

impl Snapshot {
    /// Grid height in tiles.
    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    /// Grid width in tiles. Rows are expected to be uniform; the first row is
    /// authoritative.
    pub fn width(&self) -> usize {
        self.tiles.first().map_or(0, Vec::len)
    }
}

/// A key identifier produced by the presentation layer (e.g. "ENTER", "UP").
/// Transient: written to the socket as raw bytes and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent(String);

impl InputEvent {
    pub fn new(key: impl Into<String>) -> Self {
        InputEvent(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InputEvent {
    fn from(s: &str) -> Self {
        InputEvent::new(s)
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
