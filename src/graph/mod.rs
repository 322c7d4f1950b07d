// src/graph/mod.rs

//! Immutable description of one scheduling problem.
//!
//! - [`task`] holds DAG nodes with typed parent/child edges.
//! - [`tile`] holds the processing elements.
//!
//! A [`TaskGraph`] is built once from external input and stays read-only for
//! the lifetime of a scheduling run. Edge references that do not name a task
//! of the graph are normalised to "unresolved" here, so every later stage can
//! rely on `Some(peer)` being a valid index.

pub mod task;
pub mod tile;

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

pub use task::{Capabilities, Edge, EdgePayload, Task};
pub use tile::Tile;

/// Dense task index, `0..task_count`.
pub type TaskId = usize;

/// Tile identifier as configured (not necessarily dense).
pub type TileId = u32;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("task at position {position} has id {id}; task ids must be dense and in order")]
    NonDenseId { position: usize, id: TaskId },

    #[error("task {task} has invalid computation cost {cost}")]
    InvalidCost { task: TaskId, cost: f64 },

    #[error("tile {tile} has invalid capacity {capacity}")]
    InvalidCapacity { tile: TileId, capacity: f64 },

    #[error("duplicate tile id {0}")]
    DuplicateTile(TileId),

    #[error("platform has no tiles")]
    NoTiles,
}

#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    tiles: Vec<Tile>,
}

impl TaskGraph {
    /// Validate and freeze a task set and tile pool.
    ///
    /// Task `i` must carry id `i`. Edges whose peer is out of range are
    /// rewritten to unresolved (`peer = None`) with a warning; they never
    /// fail construction.
    pub fn new(mut tasks: Vec<Task>, tiles: Vec<Tile>) -> Result<Self, GraphError> {
        if tiles.is_empty() {
            return Err(GraphError::NoTiles);
        }

        let mut seen = HashSet::new();
        for tile in &tiles {
            if !seen.insert(tile.id) {
                return Err(GraphError::DuplicateTile(tile.id));
            }
            if tile.capacity.is_nan() || tile.capacity <= 0.0 {
                return Err(GraphError::InvalidCapacity {
                    tile: tile.id,
                    capacity: tile.capacity,
                });
            }
        }

        let count = tasks.len();
        for (position, task) in tasks.iter_mut().enumerate() {
            if task.id != position {
                return Err(GraphError::NonDenseId {
                    position,
                    id: task.id,
                });
            }
            if !task.cost.is_finite() || task.cost < 0.0 {
                return Err(GraphError::InvalidCost {
                    task: task.id,
                    cost: task.cost,
                });
            }

            let id = task.id;
            for edge in task.parents.iter_mut().chain(task.children.iter_mut()) {
                if let Some(peer) = edge.peer {
                    if peer >= count {
                        warn!(task = id, peer, "edge references unknown task; treating as unresolved");
                        edge.peer = None;
                    }
                }
            }
        }

        Ok(Self { tasks, tiles })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Position of a tile in [`tiles`](Self::tiles), used to index cost tables.
    pub fn tile_index(&self, id: TileId) -> Option<usize> {
        self.tiles.iter().position(|t| t.id == id)
    }
}
