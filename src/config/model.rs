// src/config/model.rs

use serde::Deserialize;

use crate::graph::{Capabilities, Tile, TileId};
use crate::heft::ScheduleOptions;
use crate::types::{CyclePolicy, UnplaceablePolicy};

/// Number of tiles on the built-in platform.
pub const BUILTIN_TILE_COUNT: u32 = 4;
pub const BUILTIN_CAPACITY: f64 = 1000.0;
pub const BUILTIN_SPM_SIZE: u32 = 1024;
pub const BUILTIN_NUM_LANE: u32 = 4;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [scheduler]
/// unplaceable = "skip"
/// on_cycle = "error"
///
/// [[tile]]
/// id = 0
/// capacity = 1000.0
/// spm_size = 1024
/// num_lane = 4
/// has_serdiv = true
/// ```
///
/// Use `ConfigFile::try_from(raw)` to obtain a checked [`ConfigFile`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub scheduler: SchedulerSection,

    /// All `[[tile]]` entries, in file order.
    #[serde(default, rename = "tile")]
    pub tiles: Vec<TileConfig>,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SchedulerSection {
    #[serde(default)]
    pub unplaceable: UnplaceablePolicy,

    #[serde(default)]
    pub on_cycle: CyclePolicy,
}

/// One `[[tile]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileConfig {
    /// Tile id; defaults to the entry's position in the file.
    #[serde(default)]
    pub id: Option<TileId>,

    pub capacity: f64,
    pub spm_size: u32,
    pub num_lane: u32,

    #[serde(default)]
    pub has_bitalu: bool,
    #[serde(default)]
    pub has_serdiv: bool,
    #[serde(default)]
    pub has_complexunit: bool,
}

impl TileConfig {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            spm_size: self.spm_size,
            num_lane: self.num_lane,
            has_bitalu: self.has_bitalu,
            has_serdiv: self.has_serdiv,
            has_complexunit: self.has_complexunit,
        }
    }
}

/// Validated configuration: policies plus a non-empty tile pool with unique
/// ids and positive capacities.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    scheduler: SchedulerSection,
    tiles: Vec<Tile>,
}

impl ConfigFile {
    /// Only called from `validate.rs` after the checks have passed.
    pub(crate) fn new_unchecked(scheduler: SchedulerSection, tiles: Vec<Tile>) -> Self {
        Self { scheduler, tiles }
    }

    /// Four identical tiles matching the profile the upstream DAG service
    /// assigns to every task: 1 KiB scratchpad, 4 lanes, no optional units.
    pub fn builtin() -> Self {
        let offers = Capabilities {
            spm_size: BUILTIN_SPM_SIZE,
            num_lane: BUILTIN_NUM_LANE,
            ..Capabilities::default()
        };
        let tiles = (0..BUILTIN_TILE_COUNT)
            .map(|id| Tile::new(id, BUILTIN_CAPACITY, offers))
            .collect();
        Self::new_unchecked(SchedulerSection::default(), tiles)
    }

    pub fn scheduler(&self) -> &SchedulerSection {
        &self.scheduler
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn schedule_options(&self) -> ScheduleOptions {
        ScheduleOptions {
            unplaceable: self.scheduler.unplaceable,
            on_cycle: self.scheduler.on_cycle,
        }
    }
}
