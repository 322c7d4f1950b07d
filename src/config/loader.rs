// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the unchecked `RawConfigFile`.
///
/// Only performs TOML deserialization. Use [`load_and_validate`] to also
/// check the tile pool.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// File name looked up in the working directory when `--config` is absent.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Tileplan.toml")
}

/// Pick the configuration for a run.
///
/// 1. `explicit` if given (must exist).
/// 2. [`default_config_path`] inside `search_dir` if that file exists.
/// 3. [`ConfigFile::builtin`].
pub fn resolve_config(explicit: Option<&Path>, search_dir: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "loading platform config");
        return load_and_validate(path);
    }

    let candidate = search_dir.join(default_config_path());
    if candidate.is_file() {
        info!(path = %candidate.display(), "loading platform config");
        return load_and_validate(&candidate);
    }

    debug!(searched = %candidate.display(), "no config file found; using built-in platform");
    Ok(ConfigFile::builtin())
}
