#![allow(dead_code)]

use tileplan::graph::{Capabilities, Edge, Task, TaskGraph, TaskId, Tile, TileId};

/// The profile most tests run with: 1 KiB scratchpad, 4 lanes, no extras.
pub fn standard_caps() -> Capabilities {
    Capabilities {
        spm_size: 1024,
        num_lane: 4,
        ..Capabilities::default()
    }
}

/// Builder for a single [`Task`]; the id is assigned by [`GraphBuilder`].
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    cost: f64,
    requires: Capabilities,
}

impl TaskBuilder {
    pub fn new(cost: f64) -> Self {
        Self {
            cost,
            requires: standard_caps(),
        }
    }

    pub fn requires(mut self, caps: Capabilities) -> Self {
        self.requires = caps;
        self
    }

    pub fn with_bitalu(mut self) -> Self {
        self.requires.has_bitalu = true;
        self
    }

    pub fn with_complexunit(mut self) -> Self {
        self.requires.has_complexunit = true;
        self
    }

    fn build(self, id: TaskId) -> Task {
        Task::new(id, self.cost, self.requires)
    }
}

/// Builder for a [`Tile`].
#[derive(Debug, Clone)]
pub struct TileBuilder {
    id: TileId,
    capacity: f64,
    offers: Capabilities,
}

impl TileBuilder {
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            capacity: 1.0,
            offers: standard_caps(),
        }
    }

    pub fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn offers(mut self, caps: Capabilities) -> Self {
        self.offers = caps;
        self
    }

    pub fn with_bitalu(mut self) -> Self {
        self.offers.has_bitalu = true;
        self
    }

    pub fn build(self) -> Tile {
        Tile::new(self.id, self.capacity, self.offers)
    }
}

/// Builder for a [`TaskGraph`]. Tasks get ids in insertion order.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    tasks: Vec<Task>,
    tiles: Vec<Tile>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(mut self, task: TaskBuilder) -> Self {
        let id = self.tasks.len();
        self.tasks.push(task.build(id));
        self
    }

    pub fn tasks(mut self, count: usize, cost: f64) -> Self {
        for _ in 0..count {
            self = self.task(TaskBuilder::new(cost));
        }
        self
    }

    pub fn tile(mut self, tile: TileBuilder) -> Self {
        self.tiles.push(tile.build());
        self
    }

    /// Add a matching edge pair `parent → child` on port 0.
    pub fn connect(self, parent: TaskId, child: TaskId) -> Self {
        self.connect_ports(parent, 0, child, 0)
    }

    pub fn connect_ports(
        mut self,
        parent: TaskId,
        output: u32,
        child: TaskId,
        input: u32,
    ) -> Self {
        self.tasks[parent].children.push(Edge::new(Some(child), input));
        self.tasks[child].parents.push(Edge::new(Some(parent), output));
        self
    }

    /// Add a parent edge on `child` that points at no task.
    pub fn unresolved_parent(mut self, child: TaskId) -> Self {
        self.tasks[child].parents.push(Edge::new(None, 0));
        self
    }

    pub fn try_build(self) -> anyhow::Result<TaskGraph> {
        Ok(TaskGraph::new(self.tasks, self.tiles)?)
    }

    pub fn build(self) -> TaskGraph {
        self.try_build().expect("Failed to build valid task graph from builder")
    }
}
