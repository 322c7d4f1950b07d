// src/graph/task.rs

//! Task nodes, their typed edges and the capability vector shared with tiles.

use serde::{Deserialize, Serialize};

use super::TaskId;

/// Hardware feature vector.
///
/// On a [`Task`] it reads as "required", on a [`Tile`](super::Tile) as
/// "offered". Matching is exact equality of all five fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    pub spm_size: u32,
    pub num_lane: u32,
    pub has_bitalu: bool,
    pub has_serdiv: bool,
    pub has_complexunit: bool,
}

/// Port metadata carried on an edge for the output document.
///
/// The scheduler never reads these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePayload {
    /// Destination address as written in the input (hex string), or `None`
    /// when the input is not bound to an address.
    pub dest_address: Option<String>,
    pub concat_value: i64,
    pub slice_length: String,
    pub slice_data_type: String,
    pub var_name: String,
}

/// One parent or child edge of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// The task on the other end, or `None` if the reference did not resolve
    /// to a task of this graph.
    pub peer: Option<TaskId>,
    /// Output port (on parent edges) or input port (on child edges).
    pub port: u32,
    pub payload: EdgePayload,
}

impl Edge {
    pub fn new(peer: Option<TaskId>, port: u32) -> Self {
        Self {
            peer,
            port,
            payload: EdgePayload::default(),
        }
    }

    pub fn with_payload(mut self, payload: EdgePayload) -> Self {
        self.payload = payload;
        self
    }
}

/// A DAG node.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    /// Abstract work units.
    pub cost: f64,
    pub requires: Capabilities,
    pub parents: Vec<Edge>,
    pub children: Vec<Edge>,
}

impl Task {
    pub fn new(id: TaskId, cost: f64, requires: Capabilities) -> Self {
        Self {
            id,
            cost,
            requires,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Resolved parent ids, in edge order (duplicates preserved).
    pub fn parent_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.parents.iter().filter_map(|e| e.peer)
    }

    /// Resolved child ids, in edge order (duplicates preserved).
    pub fn child_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.children.iter().filter_map(|e| e.peer)
    }
}
