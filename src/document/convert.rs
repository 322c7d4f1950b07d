// src/document/convert.rs

//! Maps document task identifiers to dense [`TaskId`]s and builds the
//! [`TaskGraph`].

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::document::input::InputTask;
use crate::errors::{Result, TileplanError};
use crate::graph::{Edge, EdgePayload, Task, TaskGraph, TaskId, Tile};

/// Interns string task ids in document order.
///
/// The first record gets id 0, the second id 1, and so on.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    ids: HashMap<String, TaskId>,
    names: Vec<String>,
}

impl IdMap {
    pub fn from_tasks(tasks: &[InputTask]) -> Result<Self> {
        let mut map = IdMap::default();
        for task in tasks {
            if map.ids.contains_key(&task.task_id) {
                return Err(TileplanError::Document(format!(
                    "duplicate taskId '{}'",
                    task.task_id
                )));
            }
            map.intern(&task.task_id);
        }
        Ok(map)
    }

    fn intern(&mut self, name: &str) -> TaskId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<TaskId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: TaskId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve an edge peer, logging references to unknown tasks.
    fn resolve(&self, owner: &str, peer: &str, side: &'static str) -> Option<TaskId> {
        let id = self.get(peer);
        if id.is_none() {
            warn!(task = owner, peer, side, "edge references unknown task; treating as unresolved");
        }
        id
    }
}

/// Build the scheduler's graph for `doc` on the given tile pool.
pub fn to_graph(doc: &[InputTask], tiles: &[Tile]) -> Result<(TaskGraph, IdMap)> {
    let ids = IdMap::from_tasks(doc)?;

    let tasks: Vec<Task> = doc
        .iter()
        .enumerate()
        .map(|(id, record)| {
            let mut task = Task::new(id, record.computation_cost, record.capabilities());

            task.parents = record
                .parent_tasks
                .iter()
                .map(|p| {
                    let peer = ids.resolve(&record.task_id, &p.task_id, "parent");
                    Edge::new(peer, p.output_index).with_payload(EdgePayload {
                        dest_address: p.dest_address.clone(),
                        concat_value: p.concat_value,
                        slice_length: p.slice_length.clone(),
                        slice_data_type: p.slice_data_type.clone(),
                        var_name: p.output_var.clone(),
                    })
                })
                .collect();

            task.children = record
                .child_tasks
                .iter()
                .map(|c| {
                    let peer = ids.resolve(&record.task_id, &c.task_id, "child");
                    Edge::new(peer, c.input_index).with_payload(EdgePayload {
                        dest_address: None,
                        concat_value: c.concat_value,
                        slice_length: c.slice_length.clone(),
                        slice_data_type: c.slice_data_type.clone(),
                        var_name: c.input_var.clone(),
                    })
                })
                .collect();

            task
        })
        .collect();

    let graph = TaskGraph::new(tasks, tiles.to_vec())?;
    debug!(tasks = graph.task_count(), tiles = graph.tiles().len(), "built task graph");
    Ok((graph, ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::input::parse_input;
    use crate::graph::Capabilities;

    fn tiles() -> Vec<Tile> {
        vec![Tile::new(0, 1.0, Capabilities::default())]
    }

    #[test]
    fn ids_follow_document_order() {
        let doc = parse_input(
            r#"[
                {"taskId": "z", "computationCost": 1, "spm_size": 0, "num_lane": 0,
                 "childTasks": [{"taskId": "y", "inputIndex": 2, "concat_value": 0, "inputVar": "v"}]},
                {"taskId": "y", "computationCost": 1, "spm_size": 0, "num_lane": 0,
                 "parentTasks": [{"taskId": "z", "outputIndex": 3, "dest_address": "0x0", "concat_value": 0, "outputVar": "v"}]}
            ]"#,
        )
        .unwrap();

        let (graph, ids) = to_graph(&doc, &tiles()).unwrap();
        assert_eq!(ids.get("z"), Some(0));
        assert_eq!(ids.get("y"), Some(1));
        assert_eq!(ids.name(1), Some("y"));
        assert_eq!(ids.len(), 2);

        let y = &graph.tasks()[1];
        assert_eq!(y.parents[0].peer, Some(0));
        assert_eq!(y.parents[0].port, 3);
        assert_eq!(y.parents[0].payload.var_name, "v");
        assert_eq!(graph.tasks()[0].children[0].port, 2);
    }

    #[test]
    fn unknown_peers_become_unresolved() {
        let doc = parse_input(
            r#"[{"taskId": "a", "computationCost": 1, "spm_size": 0, "num_lane": 0,
                 "parentTasks": [{"taskId": "ghost", "outputIndex": 0, "dest_address": "0x10", "concat_value": 0, "outputVar": "g"}]}]"#,
        )
        .unwrap();

        let (graph, _) = to_graph(&doc, &tiles()).unwrap();
        let edge = &graph.tasks()[0].parents[0];
        assert_eq!(edge.peer, None);
        assert_eq!(edge.payload.dest_address.as_deref(), Some("0x10"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc = parse_input(
            r#"[{"taskId": "a", "computationCost": 1, "spm_size": 0, "num_lane": 0},
                {"taskId": "a", "computationCost": 2, "spm_size": 0, "num_lane": 0}]"#,
        )
        .unwrap();

        let err = to_graph(&doc, &tiles()).unwrap_err();
        assert!(matches!(err, TileplanError::Document(msg) if msg.contains("'a'")));
    }

    #[test]
    fn negative_cost_surfaces_as_graph_error() {
        let doc = parse_input(r#"[{"taskId": "a", "computationCost": -3, "spm_size": 0, "num_lane": 0}]"#)
            .unwrap();
        assert!(matches!(to_graph(&doc, &tiles()).unwrap_err(), TileplanError::Graph(_)));
    }
}
