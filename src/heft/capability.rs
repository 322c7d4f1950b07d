// src/heft/capability.rs

//! Exact-match capability predicate between a task and a tile.

use crate::graph::{Capabilities, Task, Tile};

/// `true` iff every field of the task's requirement vector equals the tile's.
///
/// A tile offering more than the task asks for does not match.
pub fn matches(task: &Task, tile: &Tile) -> bool {
    task.requires == tile.offers
}

/// Names of the fields on which `required` and `offered` differ.
pub fn mismatches(required: &Capabilities, offered: &Capabilities) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if required.spm_size != offered.spm_size {
        fields.push("spm_size");
    }
    if required.num_lane != offered.num_lane {
        fields.push("num_lane");
    }
    if required.has_bitalu != offered.has_bitalu {
        fields.push("has_bitalu");
    }
    if required.has_serdiv != offered.has_serdiv {
        fields.push("has_serdiv");
    }
    if required.has_complexunit != offered.has_complexunit {
        fields.push("has_complexunit");
    }
    fields
}
