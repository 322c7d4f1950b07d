// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// What to do with a task that no tile can run.
///
/// - `Error`: abort the run with a diagnostic naming the task (default).
/// - `Skip`: log a warning and leave the task (and any dependent that can
///   never become ready) without a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnplaceablePolicy {
    Error,
    Skip,
}

impl Default for UnplaceablePolicy {
    fn default() -> Self {
        UnplaceablePolicy::Error
    }
}

impl FromStr for UnplaceablePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(UnplaceablePolicy::Error),
            "skip" => Ok(UnplaceablePolicy::Skip),
            other => Err(format!(
                "invalid unplaceable policy: {other} (expected \"error\" or \"skip\")"
            )),
        }
    }
}

/// What to do when the task graph turns out to contain a cycle.
///
/// - `Error`: abort ranking with the members of the cycle (default).
/// - `Warn`: log the cycle and rank the offending branch as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    Error,
    Warn,
}

impl Default for CyclePolicy {
    fn default() -> Self {
        CyclePolicy::Error
    }
}

impl FromStr for CyclePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(CyclePolicy::Error),
            "warn" | "warning" => Ok(CyclePolicy::Warn),
            other => Err(format!(
                "invalid cycle policy: {other} (expected \"error\" or \"warn\")"
            )),
        }
    }
}
