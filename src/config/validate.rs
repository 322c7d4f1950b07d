// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigFile, RawConfigFile, TileConfig};
use crate::errors::{Result, TileplanError};
use crate::graph::{Tile, TileId};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TileplanError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_tiles(&raw)?;
        let tiles = resolve_tiles(&raw.tiles)?;
        Ok(ConfigFile::new_unchecked(raw.scheduler, tiles))
    }
}

fn ensure_has_tiles(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tiles.is_empty() {
        return Err(TileplanError::ConfigError(
            "config must contain at least one [[tile]] entry".to_string(),
        ));
    }
    Ok(())
}

fn resolve_tiles(entries: &[TileConfig]) -> Result<Vec<Tile>> {
    let mut seen: HashSet<TileId> = HashSet::new();
    let mut tiles = Vec::with_capacity(entries.len());

    for (position, entry) in entries.iter().enumerate() {
        let id = match entry.id {
            Some(id) => id,
            None => TileId::try_from(position).map_err(|_| {
                TileplanError::ConfigError(format!("tile #{position} needs an explicit id"))
            })?,
        };

        if !seen.insert(id) {
            return Err(TileplanError::ConfigError(format!(
                "duplicate tile id {id} in [[tile]] #{position}"
            )));
        }

        if entry.capacity.is_nan() || entry.capacity <= 0.0 {
            return Err(TileplanError::ConfigError(format!(
                "tile {id} must have a positive capacity (got {})",
                entry.capacity
            )));
        }

        tiles.push(Tile::new(id, entry.capacity, entry.capabilities()));
    }

    Ok(tiles)
}
