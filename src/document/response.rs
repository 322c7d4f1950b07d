// src/document/response.rs

//! Compact schedule response: `{"schedule": [{taskId, coreId, startCycle, inputs, outputs}]}`.
//!
//! Built from the full output records, so task names and input bindings match
//! the scheduled document exactly. Entries are sorted by start cycle; tasks
//! with the same start keep their sequential order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::document::output::{Binding, OrNone, OutputRecord, parse_hex};
use crate::errors::Result;
use crate::graph::TileId;

/// Inputs carry no size information; every entry reports this.
pub const PLACEHOLDER_INPUT_SIZE: u64 = 4096;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResponse {
    pub schedule: Vec<ScheduledTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledTask {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "coreId")]
    pub core_id: TileId,
    #[serde(rename = "startCycle")]
    pub start_cycle: u64,
    pub inputs: Vec<ScheduledInput>,
    pub outputs: Vec<ScheduledOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledInput {
    #[serde(rename = "sourceVariable")]
    pub source_variable: String,
    #[serde(rename = "destAddr")]
    pub dest_addr: u64,
    pub size: u64,
}

/// Outputs are not tracked by the scheduler; the list is always empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledOutput {
    #[serde(rename = "sourceAddr")]
    pub source_addr: u64,
    pub size: u64,
    #[serde(rename = "destVariable")]
    pub dest_variable: String,
}

impl Binding {
    fn name_and_address(&self) -> (&str, &str) {
        match self {
            Binding::Global {
                name, dest_address, ..
            }
            | Binding::Param {
                name, dest_address, ..
            }
            | Binding::Parent {
                name, dest_address, ..
            } => (name.as_str(), dest_address.as_str()),
        }
    }
}

/// Start times are rounded up to whole cycles.
fn start_cycle(start: f64) -> u64 {
    start.max(0.0).ceil() as u64
}

fn scheduled_input(binding: &Binding) -> ScheduledInput {
    let (name, address) = binding.name_and_address();
    // Addresses were validated while building the records; anything that
    // still fails to parse reports 0.
    let dest_addr = parse_hex(address)
        .and_then(|a| u64::try_from(a).ok())
        .unwrap_or_default();

    ScheduledInput {
        source_variable: name.to_string(),
        dest_addr,
        size: PLACEHOLDER_INPUT_SIZE,
    }
}

/// Condense output records into a schedule response.
///
/// Unplaced tasks have no core or start cycle and are left out with a warning.
pub fn schedule_response(records: &[OutputRecord<'_>]) -> ScheduleResponse {
    let mut schedule = Vec::new();

    for record in records {
        let OutputRecord::Task(task) = record else {
            continue;
        };
        let OrNone::Present(placement) = &task.placement else {
            warn!(task = task.debug_task_name, "task has no placement; left out of the schedule");
            continue;
        };

        let inputs = match &task.all_input {
            OrNone::Present(bindings) => bindings.iter().map(scheduled_input).collect(),
            OrNone::Absent => Vec::new(),
        };

        schedule.push(ScheduledTask {
            task_id: task.debug_task_name.to_string(),
            core_id: placement.tile,
            start_cycle: start_cycle(placement.start),
            inputs,
            outputs: Vec::new(),
        });
    }

    schedule.sort_by_key(|entry| entry.start_cycle);
    ScheduleResponse { schedule }
}

pub fn write_response(path: impl AsRef<Path>, response: &ScheduleResponse) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, response)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), tasks = response.schedule.len(), "wrote schedule response");
    Ok(())
}
