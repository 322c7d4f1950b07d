// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::graph::GraphError;
use crate::heft::ScheduleError;

#[derive(Error, Debug)]
pub enum TileplanError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid task document: {0}")]
    Document(String),

    #[error("Invalid task graph: {0}")]
    Graph(#[from] GraphError),

    #[error("Scheduling failed: {0}")]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TileplanError>;
