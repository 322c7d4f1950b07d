// src/heft/mod.rs

//! HEFT list scheduling over a [`TaskGraph`](crate::graph::TaskGraph).
//!
//! Stages, leaves first:
//! - [`cost`]: computation and transfer cost tables.
//! - [`capability`]: exact-match predicate between task and tile.
//! - [`rank`]: topological leveling and memoized upward rank.
//! - [`timeline`]: per-tile busy intervals with insertion-based slot search.
//! - [`driver`]: the serial `Unranked → Ranked → Allocating → Done` loop.

pub mod capability;
pub mod cost;
pub mod driver;
pub mod error;
pub mod rank;
pub mod timeline;

pub use cost::CostTables;
pub use driver::{Phase, Schedule, ScheduleOptions, Scheduler, schedule};
pub use error::{ScheduleError, UnplaceableReason};
pub use rank::{Leveling, Ranking, compute_ranks, level_tasks};
pub use timeline::{Event, Slot, Timeline};
