// src/document/dag.rs

//! Plain DAG requests: `{"dag": {"nodes": [...], "edges": [...]}}`.
//!
//! A request carries only the graph shape. Every node is expanded into a
//! full [`InputTask`] with a placeholder hardware profile, and every edge
//! becomes an unbound parent/child pair, so the result schedules like any
//! other task document.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::document::input::{ChildRef, DEFAULT_SLICE, InputTask, ParentRef};
use crate::errors::{Result, TileplanError};

/// Cost given to every node of a request.
pub const PLACEHOLDER_COST: f64 = 100.0;
pub const PLACEHOLDER_SPM_SIZE: u32 = 1024;
pub const PLACEHOLDER_NUM_LANE: u32 = 4;

/// Top-level request. Fields other than `dag` (such as `resources`) are
/// accepted and ignored; the tile pool always comes from the platform config.
#[derive(Debug, Clone, Deserialize)]
pub struct DagRequest {
    pub dag: Dag,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dag {
    pub nodes: Vec<DagNode>,
    #[serde(default)]
    pub edges: Vec<DagEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DagNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "sourceFile")]
    pub source_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DagEdge {
    #[serde(rename = "fromNode")]
    pub from_node: String,
    #[serde(rename = "toNode")]
    pub to_node: String,
    #[serde(default, rename = "dataSize")]
    pub data_size: u64,
}

pub fn parse_dag(contents: &str) -> Result<DagRequest> {
    Ok(serde_json::from_str(contents)?)
}

pub fn read_dag(path: impl AsRef<Path>) -> Result<DagRequest> {
    let contents = fs::read_to_string(path)?;
    parse_dag(&contents)
}

fn placeholder(text: &str) -> Value {
    Value::String(text.to_string())
}

/// Expand `dag` into task records, one per node in node order.
///
/// Both ends of every edge must name a node.
pub fn dag_to_tasks(dag: &Dag) -> Result<Vec<InputTask>> {
    let mut tasks: Vec<InputTask> = dag
        .nodes
        .iter()
        .map(|node| InputTask {
            task_id: node.id.clone(),
            computation_cost: PLACEHOLDER_COST,
            spm_size: PLACEHOLDER_SPM_SIZE,
            num_lane: PLACEHOLDER_NUM_LANE,
            has_bitalu: false,
            has_serdiv: false,
            has_complexunit: false,
            text_offset: placeholder("0x0"),
            data_offset: placeholder("0x0"),
            total_length: Value::from(0),
            text_length: Value::from(0),
            data_length: Value::from(0),
            output_num: 0,
            hardwareinfo: placeholder("0x0"),
            hash: placeholder("0x0"),
            parent_tasks: Vec::new(),
            child_tasks: Vec::new(),
            global_inputs: Vec::new(),
            param_inputs: Vec::new(),
            return_outputs: Vec::new(),
        })
        .collect();

    let index: HashMap<&str, usize> = dag
        .nodes
        .iter()
        .enumerate()
        .map(|(position, node)| (node.id.as_str(), position))
        .collect();

    let lookup = |id: &str, edge: &DagEdge| {
        index.get(id).copied().ok_or_else(|| {
            TileplanError::Document(format!(
                "edge {} -> {} references unknown node '{id}'",
                edge.from_node, edge.to_node
            ))
        })
    };

    for edge in &dag.edges {
        let from = lookup(&edge.from_node, edge)?;
        let to = lookup(&edge.to_node, edge)?;
        let var = format!("data_from_{}_to_{}", edge.from_node, edge.to_node);

        tasks[to].parent_tasks.push(ParentRef {
            task_id: edge.from_node.clone(),
            output_index: 0,
            dest_address: None,
            concat_value: 0,
            slice_length: DEFAULT_SLICE.to_string(),
            slice_data_type: DEFAULT_SLICE.to_string(),
            output_var: var.clone(),
        });
        tasks[from].child_tasks.push(ChildRef {
            task_id: edge.to_node.clone(),
            input_index: 0,
            concat_value: 0,
            slice_length: DEFAULT_SLICE.to_string(),
            slice_data_type: DEFAULT_SLICE.to_string(),
            input_var: var,
        });
    }

    for task in &mut tasks {
        task.output_num = task.child_tasks.len() as u32;
    }

    debug!(nodes = dag.nodes.len(), edges = dag.edges.len(), "expanded DAG request");
    Ok(tasks)
}
