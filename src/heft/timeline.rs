// src/heft/timeline.rs

//! Per-tile timelines of committed placements with insertion-based slot search.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::graph::{TaskId, TileId};

/// A committed placement. Immutable once inserted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Event {
    pub task: TaskId,
    pub tile: TileId,
    pub start: f64,
    pub finish: f64,
}

/// Where a task would go on a tile: insertion index and interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub index: usize,
    pub start: f64,
    pub finish: f64,
}

impl Slot {
    fn at(index: usize, start: f64, duration: f64) -> Self {
        Self {
            index,
            start,
            finish: start + duration,
        }
    }
}

/// Earliest slot for an interval of `duration` that may not start before
/// `ready` in a sorted, non-overlapping event list.
fn find_slot_in(events: &[Event], duration: f64, ready: f64) -> Slot {
    match events {
        [] => Slot::at(0, ready, duration),
        [only] => {
            if ready >= only.finish {
                Slot::at(1, ready, duration)
            } else if ready + duration <= only.start {
                Slot::at(0, ready, duration)
            } else {
                Slot::at(1, only.finish, duration)
            }
        }
        [first, .., last] => {
            if ready + duration <= first.start {
                return Slot::at(0, ready, duration);
            }

            let mut slot = Slot::at(events.len(), ready.max(last.finish), duration);

            // Walk the interior gaps from the tail towards the head. Every gap
            // that fits replaces the previous candidate, so the earliest one
            // wins. Once `ready` lies beyond a gap's opening, earlier gaps are
            // unusable and only the gap containing `ready` is left to try.
            for i in (1..events.len()).rev() {
                let previous = &events[i - 1];
                let current = &events[i];

                if ready > previous.finish {
                    if ready + duration <= current.start {
                        slot = Slot::at(i, ready, duration);
                    }
                    break;
                }

                if previous.finish + duration <= current.start {
                    slot = Slot::at(i, previous.finish, duration);
                }
            }

            slot
        }
    }
}

/// Busy intervals per tile, each list sorted by start and non-overlapping.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    schedules: BTreeMap<TileId, Vec<Event>>,
}

impl Timeline {
    /// Create an empty timeline for every given tile.
    pub fn new(tiles: impl IntoIterator<Item = TileId>) -> Self {
        Self {
            schedules: tiles.into_iter().map(|id| (id, Vec::new())).collect(),
        }
    }

    pub fn events(&self, tile: TileId) -> &[Event] {
        self.schedules
            .get(&tile)
            .map(|events| events.as_slice())
            .unwrap_or(&[])
    }

    pub fn into_schedules(self) -> BTreeMap<TileId, Vec<Event>> {
        self.schedules
    }

    /// Measure where `duration` would fit on `tile` without committing.
    pub fn find_slot(&self, tile: TileId, duration: f64, ready: f64) -> Slot {
        find_slot_in(self.events(tile), duration, ready)
    }

    /// Earliest feasible finish time of `task` on `tile` given `ready`.
    ///
    /// With `commit = true` the interval is inserted at its sorted position;
    /// otherwise the timeline is left untouched.
    pub fn earliest_finish(
        &mut self,
        task: TaskId,
        tile: TileId,
        duration: f64,
        ready: f64,
        commit: bool,
    ) -> f64 {
        let slot = self.find_slot(tile, duration, ready);

        if commit {
            let event = Event {
                task,
                tile,
                start: slot.start,
                finish: slot.finish,
            };
            debug!(
                task,
                tile,
                start = slot.start,
                finish = slot.finish,
                index = slot.index,
                "committing event"
            );
            self.schedules.entry(tile).or_default().insert(slot.index, event);
        }

        slot.finish
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline_with(intervals: &[(f64, f64)]) -> Timeline {
        let mut timeline = Timeline::new([0]);
        for (task, &(start, finish)) in intervals.iter().enumerate() {
            timeline.schedules.get_mut(&0).unwrap().push(Event {
                task,
                tile: 0,
                start,
                finish,
            });
        }
        timeline
    }

    fn intervals(timeline: &Timeline) -> Vec<(f64, f64)> {
        timeline.events(0).iter().map(|e| (e.start, e.finish)).collect()
    }

    #[test]
    fn empty_tile_starts_at_ready_time() {
        let mut timeline = Timeline::new([0, 1]);
        assert_eq!(timeline.earliest_finish(0, 1, 4.0, 2.5, true), 6.5);
        assert_eq!(timeline.events(1).len(), 1);
        assert!(timeline.events(0).is_empty());
    }

    #[test]
    fn single_event_cases() {
        let timeline = timeline_with(&[(5.0, 10.0)]);

        // After the event.
        assert_eq!(timeline.find_slot(0, 2.0, 12.0), Slot { index: 1, start: 12.0, finish: 14.0 });
        // Fits before it.
        assert_eq!(timeline.find_slot(0, 2.0, 1.0), Slot { index: 0, start: 1.0, finish: 3.0 });
        // Straddles it: pushed to its finish.
        assert_eq!(timeline.find_slot(0, 2.0, 4.0), Slot { index: 1, start: 10.0, finish: 12.0 });
    }

    #[test]
    fn probing_does_not_mutate() {
        let mut timeline = timeline_with(&[(0.0, 1.0), (3.0, 4.0)]);
        let finish = timeline.earliest_finish(9, 0, 1.0, 0.0, false);
        assert_eq!(finish, 2.0);
        assert_eq!(intervals(&timeline), vec![(0.0, 1.0), (3.0, 4.0)]);
    }

    #[test]
    fn exact_fit_gap_is_used_before_the_tail() {
        let mut timeline = timeline_with(&[(0.0, 10.0), (15.0, 20.0)]);
        let finish = timeline.earliest_finish(2, 0, 5.0, 0.0, true);

        assert_eq!(finish, 15.0);
        assert_eq!(
            intervals(&timeline),
            vec![(0.0, 10.0), (10.0, 15.0), (15.0, 20.0)]
        );
        assert_eq!(timeline.events(0)[1].task, 2);
    }

    #[test]
    fn earliest_of_several_gaps_wins() {
        let timeline = timeline_with(&[(0.0, 1.0), (3.0, 4.0), (6.0, 7.0)]);
        assert_eq!(timeline.find_slot(0, 1.5, 0.0), Slot { index: 1, start: 1.0, finish: 2.5 });
    }

    #[test]
    fn ready_time_inside_a_gap() {
        let timeline = timeline_with(&[(0.0, 1.0), (3.0, 4.0), (10.0, 11.0)]);
        assert_eq!(timeline.find_slot(0, 2.0, 5.0), Slot { index: 2, start: 5.0, finish: 7.0 });
        // Does not fit between 4 and 10 from ready 9: goes after the tail.
        assert_eq!(timeline.find_slot(0, 2.0, 9.0), Slot { index: 3, start: 11.0, finish: 13.0 });
    }

    #[test]
    fn head_gap_is_preferred() {
        let timeline = timeline_with(&[(5.0, 6.0), (6.5, 7.0)]);
        assert_eq!(timeline.find_slot(0, 2.0, 1.0), Slot { index: 0, start: 1.0, finish: 3.0 });
    }

    #[test]
    fn no_gap_goes_after_last_event() {
        let timeline = timeline_with(&[(0.0, 2.0), (2.0, 4.0)]);
        assert_eq!(timeline.find_slot(0, 1.0, 0.0), Slot { index: 2, start: 4.0, finish: 5.0 });
    }

    #[test]
    fn committed_events_never_overlap() {
        let mut timeline = Timeline::new([0]);
        let jobs = [(3.0, 0.0), (1.0, 0.0), (2.0, 5.0), (0.5, 0.0), (4.0, 1.0), (0.5, 3.2)];
        for (task, &(duration, ready)) in jobs.iter().enumerate() {
            timeline.earliest_finish(task, 0, duration, ready, true);
        }

        let events = timeline.events(0);
        assert_eq!(events.len(), jobs.len());
        for pair in events.windows(2) {
            assert!(pair[0].start <= pair[1].start);
            assert!(pair[0].finish <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
        for (event, &(duration, ready)) in events.iter().map(|e| (e, &jobs[e.task])) {
            assert!(event.start >= ready);
            assert_eq!(event.finish - event.start, duration);
        }
    }
}
