// src/heft/rank.rs

//! Upward-rank priorities over the task DAG.
//!
//! Two passes:
//! 1. [`level_tasks`]: Kahn's algorithm over the parent → child edges. Roots
//!    get a level equal to the number of tasks that take part in any edge;
//!    each child gets `parent_level - 1` when its in-degree reaches zero.
//!    Tasks left over when the queue drains sit on (or behind) a cycle.
//! 2. [`compute_ranks`]: for each task in id order, the task's level becomes
//!    the tie-break constant of that top-level call and the memoized upward
//!    rank is computed:
//!
//!    `rank(t) = avg_finite_cost(t) + max_c(transfer(t, c) + rank(c) + tie_break)`
//!
//!    Once a rank is memoized it is never recomputed, so descendants keep the
//!    tie-break of whichever top-level call reached them first.

use std::cmp::Ordering;
use std::collections::VecDeque;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::graph::{TaskGraph, TaskId};
use crate::heft::cost::CostTables;
use crate::heft::error::ScheduleError;
use crate::types::CyclePolicy;

/// Result of the leveling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Leveling {
    /// `None` for tasks that take part in no resolved edge, or that were
    /// never released because of a cycle.
    pub levels: Vec<Option<i64>>,
    /// Tasks with recorded in-degree that Kahn's algorithm never released.
    pub unleveled: Vec<TaskId>,
}

impl Leveling {
    pub fn tie_break(&self, task: TaskId) -> f64 {
        self.levels[task].unwrap_or(0) as f64
    }
}

pub fn level_tasks(graph: &TaskGraph) -> Leveling {
    let n = graph.task_count();
    let mut successors: Vec<Vec<TaskId>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    let mut recorded = vec![false; n];

    for task in graph.tasks() {
        for parent in task.parent_ids() {
            successors[parent].push(task.id);
            in_degree[task.id] += 1;
            recorded[task.id] = true;
            recorded[parent] = true;
        }
    }

    let root_level = recorded.iter().filter(|&&r| r).count() as i64;
    let mut levels: Vec<Option<i64>> = vec![None; n];
    let mut queue: VecDeque<TaskId> = VecDeque::new();

    for id in 0..n {
        if recorded[id] && in_degree[id] == 0 {
            levels[id] = Some(root_level);
            queue.push_back(id);
        }
    }

    while let Some(current) = queue.pop_front() {
        let current_level = levels[current].unwrap_or(root_level);
        for &child in &successors[current] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                levels[child] = Some(current_level - 1);
                queue.push_back(child);
            }
        }
    }

    let unleveled = (0..n)
        .filter(|&id| recorded[id] && levels[id].is_none())
        .collect();

    Leveling { levels, unleveled }
}

/// Members of the cycles among `candidates`, using their parent edges.
///
/// Falls back to `candidates` itself if no strongly connected component is
/// found (which cannot happen for genuine Kahn leftovers).
fn cycle_members(graph: &TaskGraph, candidates: &[TaskId]) -> Vec<TaskId> {
    let mut digraph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
    for &id in candidates {
        digraph.add_node(id);
    }
    for &id in candidates {
        for parent in graph.tasks()[id].parent_ids() {
            if digraph.contains_node(parent) {
                digraph.add_edge(parent, id, ());
            }
        }
    }

    let mut members: Vec<TaskId> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || digraph.contains_edge(scc[0], scc[0]))
        .flatten()
        .collect();

    if members.is_empty() {
        return candidates.to_vec();
    }
    members.sort_unstable();
    members
}

/// Frozen output of the ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    values: Vec<f64>,
    order: Vec<(TaskId, f64)>,
    leveling: Leveling,
}

impl Ranking {
    /// `(task, rank)` pairs sorted by descending rank; equal ranks keep
    /// ascending task id order.
    pub fn order(&self) -> &[(TaskId, f64)] {
        &self.order
    }

    pub fn rank_of(&self, task: TaskId) -> f64 {
        self.values[task]
    }

    pub fn level_of(&self, task: TaskId) -> Option<i64> {
        self.leveling.levels[task]
    }

    /// Position of each task in [`order`](Self::order), indexed by task id.
    pub fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.values.len()];
        for (position, &(task, _)) in self.order.iter().enumerate() {
            positions[task] = position;
        }
        positions
    }
}

struct UpwardRank<'a> {
    graph: &'a TaskGraph,
    costs: &'a CostTables,
    on_cycle: CyclePolicy,
    memo: Vec<Option<f64>>,
    expanding: Vec<bool>,
    path: Vec<TaskId>,
}

impl<'a> UpwardRank<'a> {
    fn new(graph: &'a TaskGraph, costs: &'a CostTables, on_cycle: CyclePolicy) -> Self {
        let n = graph.task_count();
        Self {
            graph,
            costs,
            on_cycle,
            memo: vec![None; n],
            expanding: vec![false; n],
            path: Vec::new(),
        }
    }

    fn rank(&mut self, task: TaskId, tie_break: f64) -> Result<f64, ScheduleError> {
        if let Some(rank) = self.memo[task] {
            return Ok(rank);
        }

        if self.expanding[task] {
            let start = self.path.iter().position(|&t| t == task).unwrap_or(0);
            let mut tasks = self.path[start..].to_vec();
            tasks.sort_unstable();
            return match self.on_cycle {
                CyclePolicy::Error => Err(ScheduleError::Cycle { tasks }),
                CyclePolicy::Warn => {
                    warn!(task, cycle = ?tasks, "task revisited while being ranked; using 0 for this branch");
                    Ok(0.0)
                }
            };
        }

        self.expanding[task] = true;
        self.path.push(task);

        let graph = self.graph;
        let average = self.costs.average_finite_cost(task);
        let mut heaviest_child = 0.0_f64;
        for child in graph.tasks()[task].child_ids() {
            let through_child =
                self.costs.transfer_cost(task, child) + self.rank(child, tie_break)? + tie_break;
            heaviest_child = heaviest_child.max(through_child);
        }

        self.path.pop();
        self.expanding[task] = false;

        let rank = average + heaviest_child;
        self.memo[task] = Some(rank);
        debug!(task, rank, tie_break, "ranked task");
        Ok(rank)
    }
}

pub fn compute_ranks(
    graph: &TaskGraph,
    costs: &CostTables,
    on_cycle: CyclePolicy,
) -> Result<Ranking, ScheduleError> {
    let leveling = level_tasks(graph);

    if !leveling.unleveled.is_empty() {
        let tasks = cycle_members(graph, &leveling.unleveled);
        match on_cycle {
            CyclePolicy::Error => return Err(ScheduleError::Cycle { tasks }),
            CyclePolicy::Warn => {
                warn!(cycle = ?tasks, "task graph contains a cycle; ranks may be inaccurate");
            }
        }
    }

    let mut upward = UpwardRank::new(graph, costs, on_cycle);
    for id in 0..graph.task_count() {
        upward.rank(id, leveling.tie_break(id))?;
    }

    let values: Vec<f64> = upward.memo.into_iter().map(|r| r.unwrap_or(0.0)).collect();

    let mut order: Vec<(TaskId, f64)> = values.iter().copied().enumerate().collect();
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    Ok(Ranking {
        values,
        order,
        leveling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Capabilities, Edge, Task, Tile};

    fn connect(tasks: &mut [Task], parent: TaskId, child: TaskId) {
        tasks[parent].children.push(Edge::new(Some(child), 0));
        tasks[child].parents.push(Edge::new(Some(parent), 0));
    }

    fn tasks(costs: &[f64]) -> Vec<Task> {
        costs
            .iter()
            .enumerate()
            .map(|(i, &c)| Task::new(i, c, Capabilities::default()))
            .collect()
    }

    fn build(tasks: Vec<Task>) -> (TaskGraph, CostTables) {
        let graph =
            TaskGraph::new(tasks, vec![Tile::new(0, 1.0, Capabilities::default())]).unwrap();
        let costs = CostTables::build(&graph);
        (graph, costs)
    }

    #[test]
    fn levels_follow_topological_depth() {
        // 0 -> 1 -> 2, 3 isolated
        let mut ts = tasks(&[0.0; 4]);
        connect(&mut ts, 0, 1);
        connect(&mut ts, 1, 2);
        let (graph, _) = build(ts);

        let leveling = level_tasks(&graph);
        assert_eq!(leveling.levels, vec![Some(3), Some(2), Some(1), None]);
        assert!(leveling.unleveled.is_empty());
        assert_eq!(leveling.tie_break(3), 0.0);
    }

    #[test]
    fn unresolved_parents_are_not_recorded() {
        let mut ts = tasks(&[0.0; 2]);
        ts[1].parents.push(Edge::new(None, 0));
        let (graph, _) = build(ts);
        assert_eq!(level_tasks(&graph).levels, vec![None, None]);
    }

    #[test]
    fn childless_task_rank_is_its_average_cost() {
        let (graph, costs) = build(tasks(&[0.5]));
        let ranking = compute_ranks(&graph, &costs, CyclePolicy::Error).unwrap();
        assert_eq!(ranking.rank_of(0), costs.average_finite_cost(0));
    }

    #[test]
    fn chain_rank_includes_transfer_and_tie_break() {
        // Capacity 1.0, costs 0.5 and 0.25 keep both tiles finite.
        let mut ts = tasks(&[0.5, 0.25]);
        connect(&mut ts, 0, 1);
        let (graph, costs) = build(ts);

        let ranking = compute_ranks(&graph, &costs, CyclePolicy::Error).unwrap();
        // Levels: 0 -> 2, 1 -> 1. Task 0 is ranked first with tie-break 2.
        assert_eq!(ranking.rank_of(1), 0.25);
        assert_eq!(ranking.rank_of(0), 0.5 + (1.0 + 0.25 + 2.0));
        assert_eq!(ranking.order()[0].0, 0);
        assert_eq!(ranking.positions(), vec![0, 1]);
        assert_eq!(ranking.level_of(0), Some(2));
        assert_eq!(ranking.level_of(1), Some(1));
    }

    #[test]
    fn equal_ranks_keep_id_order() {
        let (graph, costs) = build(tasks(&[0.5, 0.5, 0.5]));
        let ranking = compute_ranks(&graph, &costs, CyclePolicy::Error).unwrap();
        let ids: Vec<_> = ranking.order().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn cycle_is_reported_with_its_members() {
        // 0 -> 1 -> 2 -> 1, plus 2 -> 3 hanging off the cycle.
        let mut ts = tasks(&[0.0; 4]);
        connect(&mut ts, 0, 1);
        connect(&mut ts, 1, 2);
        connect(&mut ts, 2, 1);
        connect(&mut ts, 2, 3);
        let (graph, costs) = build(ts);

        let err = compute_ranks(&graph, &costs, CyclePolicy::Error).unwrap_err();
        assert_eq!(err, ScheduleError::Cycle { tasks: vec![1, 2] });
    }

    #[test]
    fn cycle_under_warn_policy_still_ranks_everything() {
        let mut ts = tasks(&[0.5, 0.5]);
        connect(&mut ts, 0, 1);
        connect(&mut ts, 1, 0);
        let (graph, costs) = build(ts);

        let ranking = compute_ranks(&graph, &costs, CyclePolicy::Warn).unwrap();
        assert_eq!(ranking.order().len(), 2);
        assert!(ranking.rank_of(0).is_finite());
        assert!(ranking.rank_of(1).is_finite());
    }

    #[test]
    fn child_only_cycle_is_caught_by_the_recursion_guard() {
        // Child edges form 0 -> 1 -> 0 but neither side acknowledges a parent,
        // so leveling sees no edges at all.
        let mut ts = tasks(&[0.0; 2]);
        ts[0].children.push(Edge::new(Some(1), 0));
        ts[1].children.push(Edge::new(Some(0), 0));
        let (graph, costs) = build(ts);

        let err = compute_ranks(&graph, &costs, CyclePolicy::Error).unwrap_err();
        assert_eq!(err, ScheduleError::Cycle { tasks: vec![0, 1] });
    }
}
