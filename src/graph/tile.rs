// src/graph/tile.rs

use super::TileId;
use super::task::Capabilities;

/// A processing element of the target platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: TileId,
    /// Throughput scalar: a task of cost `c` runs for `c / capacity`.
    pub capacity: f64,
    pub offers: Capabilities,
}

impl Tile {
    pub fn new(id: TileId, capacity: f64, offers: Capabilities) -> Self {
        Self {
            id,
            capacity,
            offers,
        }
    }
}
