// src/heft/error.rs

use std::fmt;

use thiserror::Error;

use crate::graph::TaskId;
use crate::heft::driver::Phase;

/// Why a task did not receive a placement.
#[derive(Debug, Clone, PartialEq)]
pub enum UnplaceableReason {
    /// No tile offers exactly the required capabilities.
    NoMatchingTile,
    /// Matching tiles exist but none yields a finite finish time.
    NoFiniteSlot,
    /// Resolved parents that never received a finish time.
    BlockedBy(Vec<TaskId>),
}

impl fmt::Display for UnplaceableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingTile => write!(f, "no tile matches its capability requirements"),
            Self::NoFiniteSlot => write!(f, "no matching tile yields a finite finish time"),
            Self::BlockedBy(parents) => write!(f, "parents {parents:?} were never placed"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("cycle detected in task graph involving tasks {tasks:?}")]
    Cycle { tasks: Vec<TaskId> },

    #[error("task {task} cannot be placed: {reason}")]
    Unplaceable {
        task: TaskId,
        reason: UnplaceableReason,
    },

    #[error("invalid scheduler transition: {from} -> {to}")]
    InvalidTransition { from: Phase, to: Phase },
}
