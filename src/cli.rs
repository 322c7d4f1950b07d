// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `tileplan`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tileplan",
    version,
    about = "Map a task DAG onto heterogeneous tiles with HEFT list scheduling.",
    long_about = None
)]
pub struct CliArgs {
    /// Task document to schedule (JSON).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the scheduled task document (JSON).
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Path to the platform config file (TOML).
    ///
    /// Default: `Tileplan.toml` in the current working directory if present,
    /// otherwise the built-in four-tile platform.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TILEPLAN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Schedule and print ranks and timelines, but don't write OUTPUT.
    #[arg(long)]
    pub dry_run: bool,

    /// Shape of INPUT.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = InputFormat::Document)]
    pub input_format: InputFormat,

    /// Shape of OUTPUT.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Document)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Full task document with hardware profiles and edge bindings.
    Document,
    /// `{"dag": {"nodes", "edges"}}` request; nodes get a placeholder profile.
    Dag,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Scheduled task document re-keyed by rank.
    Document,
    /// `{"schedule": [...]}` with core and start cycle per task.
    Schedule,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
