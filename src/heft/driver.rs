// src/heft/driver.rs

//! Serial scheduling loop: costs → ranks → allocation.
//!
//! The driver moves through `Unranked → Ranked → Allocating → Done`. Every
//! mutation of the timeline happens here, one task at a time, because the
//! slot found for a task depends on everything committed before it.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::graph::{TaskGraph, TaskId, TileId};
use crate::heft::capability;
use crate::heft::cost::CostTables;
use crate::heft::error::{ScheduleError, UnplaceableReason};
use crate::heft::rank::{Ranking, compute_ranks};
use crate::heft::timeline::{Event, Timeline};
use crate::types::{CyclePolicy, UnplaceablePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unranked,
    Ranked,
    Allocating,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Unranked => "unranked",
            Phase::Ranked => "ranked",
            Phase::Allocating => "allocating",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleOptions {
    pub unplaceable: UnplaceablePolicy,
    pub on_cycle: CyclePolicy,
}

/// Final output of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub ranking: Ranking,
    /// Committed events per tile, sorted by start time.
    pub events: BTreeMap<TileId, Vec<Event>>,
    pub finish_times: BTreeMap<TaskId, f64>,
    /// Tasks left without a placement under [`UnplaceablePolicy::Skip`].
    pub unplaced: Vec<(TaskId, UnplaceableReason)>,
}

impl Schedule {
    pub fn ranks(&self) -> &[(TaskId, f64)] {
        self.ranking.order()
    }

    pub fn all_events(&self) -> impl Iterator<Item = &Event> {
        self.events.values().flatten()
    }

    pub fn placement_of(&self, task: TaskId) -> Option<&Event> {
        self.all_events().find(|e| e.task == task)
    }

    /// Latest finish time over all placed tasks, 0 for an empty schedule.
    pub fn makespan(&self) -> f64 {
        self.finish_times.values().copied().fold(0.0, f64::max)
    }
}

/// Run all phases on `graph`.
pub fn schedule(graph: &TaskGraph, options: ScheduleOptions) -> Result<Schedule, ScheduleError> {
    let mut scheduler = Scheduler::new(graph, options);
    scheduler.rank()?;
    scheduler.allocate()?;
    scheduler.finish()
}

#[derive(Debug)]
pub struct Scheduler<'a> {
    graph: &'a TaskGraph,
    options: ScheduleOptions,
    phase: Phase,
    costs: CostTables,
    ranking: Option<Ranking>,
    timeline: Timeline,
    finish_times: BTreeMap<TaskId, f64>,
    unplaced: Vec<(TaskId, UnplaceableReason)>,
}

impl<'a> Scheduler<'a> {
    pub fn new(graph: &'a TaskGraph, options: ScheduleOptions) -> Self {
        Self {
            graph,
            options,
            phase: Phase::Unranked,
            costs: CostTables::build(graph),
            ranking: None,
            timeline: Timeline::new(graph.tiles().iter().map(|t| t.id)),
            finish_times: BTreeMap::new(),
            unplaced: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn expect_phase(&self, expected: Phase, to: Phase) -> Result<(), ScheduleError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ScheduleError::InvalidTransition {
                from: self.phase,
                to,
            })
        }
    }

    /// `Unranked → Ranked`: rank every task from the cost tables built in
    /// [`new`](Self::new).
    pub fn rank(&mut self) -> Result<&Ranking, ScheduleError> {
        self.expect_phase(Phase::Unranked, Phase::Ranked)?;

        let ranking = compute_ranks(self.graph, &self.costs, self.options.on_cycle)?;
        debug!(tasks = ranking.order().len(), "ranking complete");

        self.phase = Phase::Ranked;
        let ranking: &Ranking = self.ranking.insert(ranking);
        Ok(ranking)
    }

    /// `Ranked → Allocating → Done`: place every task that can be placed.
    pub fn allocate(&mut self) -> Result<(), ScheduleError> {
        self.expect_phase(Phase::Ranked, Phase::Allocating)?;
        self.phase = Phase::Allocating;

        let mut remaining: Vec<TaskId> = (0..self.graph.task_count()).collect();
        let mut sweeps = 0usize;

        while !remaining.is_empty() {
            sweeps += 1;
            let order = self.allocation_order(&remaining);
            let mut deferred = Vec::new();
            let mut placed_any = false;

            for task in order {
                if !self.parents_placed(task) {
                    deferred.push(task);
                    continue;
                }
                if self.allocate_task(task)? {
                    placed_any = true;
                }
            }

            debug!(sweep = sweeps, deferred = deferred.len(), "allocation sweep finished");
            remaining = deferred;
            if !placed_any {
                break;
            }
        }

        for task in remaining {
            let blocked_by: Vec<TaskId> = self.graph.tasks()[task]
                .parent_ids()
                .filter(|&p| p != task && !self.finish_times.contains_key(&p))
                .collect();
            self.reject(task, UnplaceableReason::BlockedBy(blocked_by))?;
        }

        let makespan = self.finish_times.values().copied().fold(0.0, f64::max);
        info!(
            placed = self.finish_times.len(),
            unplaced = self.unplaced.len(),
            sweeps,
            makespan,
            "allocation complete"
        );

        self.phase = Phase::Done;
        Ok(())
    }

    /// `Done`: hand out the frozen schedule.
    pub fn finish(self) -> Result<Schedule, ScheduleError> {
        self.expect_phase(Phase::Done, Phase::Done)?;

        let ranking = self.ranking.ok_or(ScheduleError::InvalidTransition {
            from: Phase::Unranked,
            to: Phase::Done,
        })?;

        Ok(Schedule {
            ranking,
            events: self.timeline.into_schedules(),
            finish_times: self.finish_times,
            unplaced: self.unplaced,
        })
    }

    /// Tasks whose parents are all placed come first; within each group,
    /// descending rank (ties by task id).
    fn allocation_order(&self, remaining: &[TaskId]) -> Vec<TaskId> {
        let mut pending = vec![false; self.graph.task_count()];
        for &task in remaining {
            pending[task] = true;
        }

        let mut order: Vec<TaskId> = self
            .ranking
            .iter()
            .flat_map(|r| r.order().iter().map(|&(task, _)| task))
            .filter(|&task| pending[task])
            .collect();
        order.sort_by_key(|&task| !self.parents_placed(task));
        order
    }

    fn parents_placed(&self, task: TaskId) -> bool {
        self.graph.tasks()[task]
            .parent_ids()
            .all(|p| p == task || self.finish_times.contains_key(&p))
    }

    /// Earliest time `task` may start given its placed parents.
    /// A self parent is never in `finish_times` here, so it adds nothing.
    fn ready_time(&self, task: TaskId) -> f64 {
        self.graph.tasks()[task]
            .parent_ids()
            .filter_map(|p| Some(self.finish_times.get(&p)? + self.costs.transfer_cost(p, task)))
            .fold(0.0, f64::max)
    }

    /// Place `task` on its best tile. Returns `false` if it was skipped.
    fn allocate_task(&mut self, task: TaskId) -> Result<bool, ScheduleError> {
        match self.place(task) {
            Ok(()) => Ok(true),
            Err(reason) => {
                self.reject(task, reason)?;
                Ok(false)
            }
        }
    }

    fn place(&mut self, task: TaskId) -> Result<(), UnplaceableReason> {
        let graph = self.graph;
        let info = &graph.tasks()[task];
        let ready = self.ready_time(task);

        let mut matched = false;
        // (tile, duration, finish)
        let mut best: Option<(TileId, f64, f64)> = None;

        for (index, tile) in graph.tiles().iter().enumerate() {
            if !capability::matches(info, tile) {
                debug!(
                    task,
                    tile = tile.id,
                    mismatched = ?capability::mismatches(&info.requires, &tile.offers),
                    "tile does not match"
                );
                continue;
            }
            matched = true;

            let duration = self.costs.execution_time(task, index);
            let finish = self.timeline.earliest_finish(task, tile.id, duration, ready, false);
            debug!(task, tile = tile.id, ready, finish, "probed tile");

            if !finish.is_finite() {
                continue;
            }
            if best.is_none_or(|(_, _, best_finish)| finish < best_finish) {
                best = Some((tile.id, duration, finish));
            }
        }

        let Some((tile, duration, finish)) = best else {
            return Err(if matched {
                UnplaceableReason::NoFiniteSlot
            } else {
                UnplaceableReason::NoMatchingTile
            });
        };

        let committed = self.timeline.earliest_finish(task, tile, duration, ready, true);
        debug_assert_eq!(committed, finish);
        self.finish_times.insert(task, committed);
        info!(task, tile, start = committed - duration, finish = committed, "placed task");
        Ok(())
    }

    fn reject(&mut self, task: TaskId, reason: UnplaceableReason) -> Result<(), ScheduleError> {
        match self.options.unplaceable {
            UnplaceablePolicy::Error => Err(ScheduleError::Unplaceable { task, reason }),
            UnplaceablePolicy::Skip => {
                warn!(task, %reason, "leaving task unplaced");
                self.unplaced.push((task, reason));
                Ok(())
            }
        }
    }
}
