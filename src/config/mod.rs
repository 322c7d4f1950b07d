// src/config/mod.rs

//! Platform configuration for tileplan.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to the built-in platform
//!   (`loader.rs`).
//! - Validate the tile pool while converting raw → checked config
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_config};
pub use model::{ConfigFile, RawConfigFile, SchedulerSection, TileConfig};
