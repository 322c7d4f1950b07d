// src/document/output.rs

//! The scheduled task document.
//!
//! Records are re-keyed by *sequential id*: a task's position in the
//! descending-rank list. Port bindings reference tasks by sequential id and
//! encode `(task, port)` as `"0b"` + 6 id bits + 4 port bits. The last array
//! element aggregates every task's return outputs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Serialize, Serializer};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::document::input::InputTask;
use crate::errors::{Result, TileplanError};
use crate::graph::{TaskGraph, TileId};
use crate::heft::Schedule;

const ID_BITS: u32 = 6;
const PORT_BITS: u32 = 4;

/// Port string used for inputs that do not come from another task.
pub const UNSOURCED_PORT: &str = "0b0000000000";

/// Sequential id written for parent edges that did not resolve.
const UNRESOLVED_ID: i64 = -1;

/// A value that is written as the string `"None"` when absent.
#[derive(Debug, Clone, PartialEq)]
pub enum OrNone<T> {
    Present(T),
    Absent,
}

impl<T> OrNone<Vec<T>> {
    pub fn non_empty(items: Vec<T>) -> Self {
        if items.is_empty() {
            OrNone::Absent
        } else {
            OrNone::Present(items)
        }
    }
}

impl<T> From<Option<T>> for OrNone<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => OrNone::Present(v),
            None => OrNone::Absent,
        }
    }
}

impl<T: Serialize> Serialize for OrNone<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            OrNone::Present(value) => value.serialize(serializer),
            OrNone::Absent => serializer.serialize_str("None"),
        }
    }
}

/// One entry of a task's `all_input` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Binding {
    Global {
        name: String,
        dest_address: String,
        #[serde(rename = "parentTasksPort")]
        port: String,
    },
    Param {
        name: String,
        dest_address: String,
        #[serde(rename = "parentTasksPort")]
        port: String,
        slice_length: String,
        slice_data_type: String,
        slice_data_dest_str: String,
    },
    Parent {
        #[serde(rename = "type")]
        kind: &'static str,
        #[serde(rename = "parentTasks")]
        parent: String,
        name: String,
        dest_address: String,
        #[serde(rename = "parentTasksPort")]
        port: String,
        concat_value: i64,
        slice_length: String,
        slice_data_type: String,
        slice_data_dest_str: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub tile: TileId,
    pub start: f64,
    pub finish: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord<'a> {
    pub debug_task_name: &'a str,
    #[serde(rename = "current_taskId")]
    pub current_task_id: usize,
    pub text_offset: &'a Value,
    pub data_offset: &'a Value,
    pub total_length: &'a Value,
    pub text_length: &'a Value,
    pub data_length: &'a Value,
    pub hardwareinfo: &'a Value,
    pub hash: &'a Value,
    #[serde(rename = "Input_Num")]
    pub input_num: usize,
    #[serde(rename = "Output_Num")]
    pub output_num: u32,
    pub all_input: OrNone<Vec<Binding>>,
    pub placement: OrNone<Placement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnBinding {
    pub name: String,
    #[serde(rename = "parentTasks")]
    pub parent: String,
    #[serde(rename = "parentTasksPort")]
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnTable {
    pub return_output: OrNone<Vec<ReturnBinding>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputRecord<'a> {
    Task(TaskRecord<'a>),
    Returns(ReturnTable),
}

/// `"0b"` + low 6 bits of `id` + low 4 bits of `port`.
///
/// Out-of-range values are truncated with a warning; the unresolved id `-1`
/// renders as all ones.
pub fn port_bits(id: i64, port: u32) -> String {
    let id_mask = (1i64 << ID_BITS) - 1;
    let port_mask = (1u32 << PORT_BITS) - 1;

    if id > id_mask {
        warn!(id, bits = ID_BITS, "task id does not fit the port encoding; truncating");
    }
    if port > port_mask {
        warn!(port, bits = PORT_BITS, "port index does not fit the port encoding; truncating");
    }

    format!(
        "0b{:0iw$b}{:0pw$b}",
        id & id_mask,
        port & port_mask,
        iw = ID_BITS as usize,
        pw = PORT_BITS as usize
    )
}

pub(crate) fn parse_hex(value: &str) -> Option<i64> {
    let digits = value
        .trim()
        .strip_prefix("0x")
        .or_else(|| value.trim().strip_prefix("0X"))
        .unwrap_or(value.trim());
    i64::from_str_radix(digits, 16).ok()
}

/// `"0x"` + uppercase hex of `base + slice_length × slice_data_type`.
pub fn slice_destination(base: &str, slice_length: &str, slice_data_type: &str) -> Result<String> {
    let invalid = |what: &str, value: &str| {
        TileplanError::Document(format!("invalid {what} '{value}'"))
    };

    let base_value = parse_hex(base).ok_or_else(|| invalid("dest_address", base))?;
    let length: i64 = slice_length
        .trim()
        .parse()
        .map_err(|_| invalid("slice_length", slice_length))?;
    let width: i64 = slice_data_type
        .trim()
        .parse()
        .map_err(|_| invalid("slice_data_type", slice_data_type))?;

    let destination = length
        .checked_mul(width)
        .and_then(|offset| base_value.checked_add(offset))
        .filter(|d| *d >= 0)
        .ok_or_else(|| {
            TileplanError::Document(format!(
                "slice destination {base} + {slice_length} x {slice_data_type} is out of range"
            ))
        })?;

    Ok(format!("0x{destination:X}"))
}

/// Assemble the output document for a finished schedule.
///
/// `doc` and `graph` must describe the same tasks in the same order, as
/// produced by [`to_graph`](super::convert::to_graph).
pub fn build_output<'a>(
    doc: &'a [InputTask],
    graph: &TaskGraph,
    schedule: &Schedule,
) -> Result<Vec<OutputRecord<'a>>> {
    let sequential = schedule.ranking.positions();
    let mut records = Vec::with_capacity(doc.len() + 1);
    let mut returns = Vec::new();

    for (position, &(task, _)) in schedule.ranks().iter().enumerate() {
        let record = &doc[task];
        let mut inputs = Vec::new();

        for (name, address) in record.bound_globals() {
            inputs.push(Binding::Global {
                name: name.to_string(),
                dest_address: address.to_string(),
                port: UNSOURCED_PORT.to_string(),
            });
        }

        for param in record.bound_params() {
            let address = param.dest_address.as_deref().unwrap_or_default();
            inputs.push(Binding::Param {
                name: param.name.clone(),
                dest_address: address.to_string(),
                port: UNSOURCED_PORT.to_string(),
                slice_length: param.slice_length.clone(),
                slice_data_type: param.slice_data_type.clone(),
                slice_data_dest_str: slice_destination(
                    address,
                    &param.slice_length,
                    &param.slice_data_type,
                )?,
            });
        }

        for edge in &graph.tasks()[task].parents {
            let payload = &edge.payload;
            let Some(address) = payload.dest_address.as_deref() else {
                continue;
            };
            let parent = edge
                .peer
                .map(|p| sequential[p] as i64)
                .unwrap_or(UNRESOLVED_ID);

            inputs.push(Binding::Parent {
                kind: "0b00",
                parent: parent.to_string(),
                name: payload.var_name.clone(),
                dest_address: address.to_string(),
                port: port_bits(parent, edge.port),
                concat_value: payload.concat_value,
                slice_length: payload.slice_length.clone(),
                slice_data_type: payload.slice_data_type.clone(),
                slice_data_dest_str: slice_destination(
                    address,
                    &payload.slice_length,
                    &payload.slice_data_type,
                )?,
            });
        }

        for ret in &record.return_outputs {
            returns.push(ReturnBinding {
                name: ret.name.clone(),
                parent: position.to_string(),
                port: port_bits(position as i64, ret.index),
            });
        }

        let placement = schedule.placement_of(task).map(|event| Placement {
            tile: event.tile,
            start: event.start,
            finish: event.finish,
        });

        records.push(OutputRecord::Task(TaskRecord {
            debug_task_name: &record.task_id,
            current_task_id: position,
            text_offset: &record.text_offset,
            data_offset: &record.data_offset,
            total_length: &record.total_length,
            text_length: &record.text_length,
            data_length: &record.data_length,
            hardwareinfo: &record.hardwareinfo,
            hash: &record.hash,
            input_num: inputs.len(),
            output_num: record.output_num,
            all_input: OrNone::non_empty(inputs),
            placement: placement.into(),
        }));
    }

    records.push(OutputRecord::Returns(ReturnTable {
        return_output: OrNone::non_empty(returns),
    }));

    Ok(records)
}

/// Serialize `records` with 4-space indentation.
pub fn write_records<W: Write>(writer: W, records: &[OutputRecord<'_>]) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    records.serialize(&mut serializer)?;
    Ok(())
}

pub fn write_output(path: impl AsRef<Path>, records: &[OutputRecord<'_>]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), records = records.len(), "wrote scheduled document");
    Ok(())
}
