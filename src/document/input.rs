// src/document/input.rs

//! serde model of the incoming task document.
//!
//! The document is a JSON array of task records. Identifiers are opaque
//! strings; [`convert`](super::convert) maps them onto dense task ids.
//! Layout fields (`text_offset`, `hardwareinfo`, ...) are carried as raw
//! JSON values and written back untouched.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::Result;
use crate::graph::Capabilities;

/// Slice fields absent from an edge or parameter default to this.
pub const DEFAULT_SLICE: &str = "0";

fn default_slice() -> String {
    DEFAULT_SLICE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputTask {
    #[serde(rename = "taskId")]
    pub task_id: String,

    #[serde(rename = "computationCost")]
    pub computation_cost: f64,

    pub spm_size: u32,
    pub num_lane: u32,

    #[serde(default, deserialize_with = "flag")]
    pub has_bitalu: bool,
    #[serde(default, deserialize_with = "flag")]
    pub has_serdiv: bool,
    #[serde(default, deserialize_with = "flag")]
    pub has_complexunit: bool,

    #[serde(default)]
    pub text_offset: Value,
    #[serde(default)]
    pub data_offset: Value,
    #[serde(default)]
    pub total_length: Value,
    #[serde(default)]
    pub text_length: Value,
    #[serde(default)]
    pub data_length: Value,

    #[serde(default)]
    pub output_num: u32,
    #[serde(default)]
    pub hardwareinfo: Value,
    #[serde(default)]
    pub hash: Value,

    #[serde(default, rename = "parentTasks")]
    pub parent_tasks: Vec<ParentRef>,
    #[serde(default, rename = "childTasks")]
    pub child_tasks: Vec<ChildRef>,
    #[serde(default, rename = "global_Input")]
    pub global_inputs: Vec<GlobalInput>,
    #[serde(default, rename = "para_Input")]
    pub param_inputs: Vec<ParamInput>,
    #[serde(default, rename = "return_output")]
    pub return_outputs: Vec<ReturnOutput>,
}

impl InputTask {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            spm_size: self.spm_size,
            num_lane: self.num_lane,
            has_bitalu: self.has_bitalu,
            has_serdiv: self.has_serdiv,
            has_complexunit: self.has_complexunit,
        }
    }

    /// Global inputs bound to an address.
    pub fn bound_globals(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.global_inputs
            .iter()
            .filter_map(|g| Some((g.name.as_str(), g.dest_address.as_deref()?)))
    }

    /// Parameter inputs bound to an address.
    pub fn bound_params(&self) -> impl Iterator<Item = &ParamInput> + '_ {
        self.param_inputs.iter().filter(|p| p.dest_address.is_some())
    }
}

/// An entry of `parentTasks`: where one of this task's inputs comes from.
#[derive(Debug, Clone, Deserialize)]
pub struct ParentRef {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "outputIndex")]
    pub output_index: u32,
    #[serde(default, deserialize_with = "address")]
    pub dest_address: Option<String>,
    #[serde(default)]
    pub concat_value: i64,
    #[serde(default = "default_slice", deserialize_with = "text")]
    pub slice_length: String,
    #[serde(default = "default_slice", deserialize_with = "text")]
    pub slice_data_type: String,
    #[serde(default, rename = "outputVar")]
    pub output_var: String,
}

/// An entry of `childTasks`: a consumer of one of this task's outputs.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildRef {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "inputIndex")]
    pub input_index: u32,
    #[serde(default)]
    pub concat_value: i64,
    #[serde(default = "default_slice", deserialize_with = "text")]
    pub slice_length: String,
    #[serde(default = "default_slice", deserialize_with = "text")]
    pub slice_data_type: String,
    #[serde(default, rename = "inputVar")]
    pub input_var: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalInput {
    pub name: String,
    #[serde(default, deserialize_with = "address")]
    pub dest_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamInput {
    pub name: String,
    #[serde(default, deserialize_with = "address")]
    pub dest_address: Option<String>,
    #[serde(default = "default_slice", deserialize_with = "text")]
    pub slice_length: String,
    #[serde(default = "default_slice", deserialize_with = "text")]
    pub slice_data_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnOutput {
    pub name: String,
    pub index: u32,
}

/// Capability flags arrive either as JSON booleans or as 0/1 integers.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// `null` and the string `"null"` both mean "not bound to an address".
fn address<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| s != "null"))
}

/// Slice fields are strings in the document, but plain numbers are accepted.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Int(i64),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::Str(s) => s,
        Text::Int(i) => i.to_string(),
    })
}

pub fn parse_input(contents: &str) -> Result<Vec<InputTask>> {
    Ok(serde_json::from_str(contents)?)
}

pub fn read_input(path: impl AsRef<Path>) -> Result<Vec<InputTask>> {
    let contents = fs::read_to_string(path)?;
    parse_input(&contents)
}
