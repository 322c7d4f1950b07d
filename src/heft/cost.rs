// src/heft/cost.rs

//! Dense cost tables, built once per run and read-only afterwards.
//!
//! Two views of computation cost are kept per (task, tile) pair:
//! - the *rank* view, `+inf` when the tile's capacity is below the task's
//!   cost, used only when averaging for the upward rank;
//! - the *execution time* `cost / capacity`, used by the timeline allocator
//!   on every capability-matching tile.
//!
//! Tiles are addressed by their position in [`TaskGraph::tiles`].

use tracing::debug;

use crate::graph::{Task, TaskGraph, TaskId, Tile};

/// Weight of one matching edge pair in the transfer cost.
const EDGE_TRANSFER_WEIGHT: f64 = 1.0;

/// Rank-view computation cost of `task` on `tile`.
pub fn computation_cost(task: &Task, tile: &Tile) -> f64 {
    if tile.capacity < task.cost {
        f64::INFINITY
    } else {
        task.cost / tile.capacity
    }
}

/// Time `task` occupies `tile` once placed there.
pub fn execution_time(task: &Task, tile: &Tile) -> f64 {
    task.cost / tile.capacity
}

/// Number of matching edge pairs from `parent` to `child`.
///
/// Each child edge of `parent` that points at `child` counts once, provided
/// `child` lists `parent` among its own parent edges. Unresolved edges never
/// count.
pub fn transfer_cost(parent: &Task, child: &Task) -> f64 {
    let acknowledged = child.parent_ids().any(|p| p == parent.id);
    if !acknowledged {
        return 0.0;
    }

    parent
        .child_ids()
        .filter(|&c| c == child.id)
        .map(|_| EDGE_TRANSFER_WEIGHT)
        .sum()
}

#[derive(Debug, Clone)]
pub struct CostTables {
    /// `[task][tile]`, `+inf` marks capacity below cost.
    computation: Vec<Vec<f64>>,
    /// `[task][tile]`, raw `cost / capacity`.
    execution: Vec<Vec<f64>>,
    /// `[parent][child]`, full matrix including self-pairs.
    transfer: Vec<Vec<f64>>,
}

impl CostTables {
    pub fn build(graph: &TaskGraph) -> Self {
        let tasks = graph.tasks();
        let tiles = graph.tiles();

        let computation: Vec<Vec<f64>> = tasks
            .iter()
            .map(|task| tiles.iter().map(|tile| computation_cost(task, tile)).collect())
            .collect();

        let execution: Vec<Vec<f64>> = tasks
            .iter()
            .map(|task| tiles.iter().map(|tile| execution_time(task, tile)).collect())
            .collect();

        let transfer: Vec<Vec<f64>> = tasks
            .iter()
            .map(|parent| tasks.iter().map(|child| transfer_cost(parent, child)).collect())
            .collect();

        let infeasible = computation
            .iter()
            .flatten()
            .filter(|c| c.is_infinite())
            .count();
        debug!(
            tasks = tasks.len(),
            tiles = tiles.len(),
            infeasible_pairs = infeasible,
            "built cost tables"
        );

        Self {
            computation,
            execution,
            transfer,
        }
    }

    pub fn computation_cost(&self, task: TaskId, tile_index: usize) -> f64 {
        self.computation[task][tile_index]
    }

    pub fn execution_time(&self, task: TaskId, tile_index: usize) -> f64 {
        self.execution[task][tile_index]
    }

    pub fn transfer_cost(&self, parent: TaskId, child: TaskId) -> f64 {
        self.transfer[parent][child]
    }

    /// Mean of the finite rank-view costs of `task`, or 0 if none is finite.
    pub fn average_finite_cost(&self, task: TaskId) -> f64 {
        let (sum, count) = self.computation[task]
            .iter()
            .filter(|c| c.is_finite())
            .fold((0.0, 0usize), |(sum, count), c| (sum + c, count + 1));

        if count == 0 { 0.0 } else { sum / count as f64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Capabilities, Edge};

    fn connect(tasks: &mut [Task], parent: TaskId, child: TaskId) {
        tasks[parent].children.push(Edge::new(Some(child), 0));
        tasks[child].parents.push(Edge::new(Some(parent), 0));
    }

    fn graph(tasks: Vec<Task>, capacities: &[f64]) -> TaskGraph {
        let tiles = capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Tile::new(i as u32, c, Capabilities::default()))
            .collect();
        TaskGraph::new(tasks, tiles).unwrap()
    }

    #[test]
    fn capacity_below_cost_is_infinite_in_rank_view_only() {
        let task = Task::new(0, 10.0, Capabilities::default());
        let small = Tile::new(0, 1.0, Capabilities::default());
        let big = Tile::new(1, 20.0, Capabilities::default());

        assert!(computation_cost(&task, &small).is_infinite());
        assert_eq!(execution_time(&task, &small), 10.0);
        assert_eq!(computation_cost(&task, &big), 0.5);
    }

    #[test]
    fn average_ignores_infinite_entries() {
        let g = graph(vec![Task::new(0, 10.0, Capabilities::default())], &[1.0, 10.0, 20.0]);
        let costs = CostTables::build(&g);

        assert!(costs.computation_cost(0, 0).is_infinite());
        assert_eq!(costs.average_finite_cost(0), (1.0 + 0.5) / 2.0);
    }

    #[test]
    fn average_is_zero_when_nothing_is_finite() {
        let g = graph(vec![Task::new(0, 10.0, Capabilities::default())], &[1.0]);
        assert_eq!(CostTables::build(&g).average_finite_cost(0), 0.0);
    }

    #[test]
    fn transfer_counts_matching_edge_pairs() {
        let mut tasks: Vec<Task> = (0..3).map(|i| Task::new(i, 1.0, Capabilities::default())).collect();
        connect(&mut tasks, 0, 1);
        connect(&mut tasks, 0, 1);
        // 0 -> 2 only declared on the parent side.
        tasks[0].children.push(Edge::new(Some(2), 0));
        tasks[0].children.push(Edge::new(None, 0));

        let g = graph(tasks, &[1.0]);
        let costs = CostTables::build(&g);

        assert_eq!(costs.transfer_cost(0, 1), 2.0);
        assert_eq!(costs.transfer_cost(0, 2), 0.0);
        assert_eq!(costs.transfer_cost(1, 0), 0.0);
        assert_eq!(costs.transfer_cost(0, 0), 0.0);
    }

    #[test]
    fn infinite_capacity_costs_nothing() {
        let g = graph(vec![Task::new(0, 5.0, Capabilities::default())], &[f64::INFINITY]);
        let costs = CostTables::build(&g);
        assert_eq!(costs.computation_cost(0, 0), 0.0);
        assert_eq!(costs.execution_time(0, 0), 0.0);
    }
}
