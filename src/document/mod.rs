// src/document/mod.rs

//! JSON task documents in and out of the scheduler.
//!
//! - [`input`]: serde model and reader for the incoming document.
//! - [`convert`]: string id interning and [`TaskGraph`](crate::graph::TaskGraph)
//!   construction.
//! - [`output`]: sequentially re-keyed records with port bindings.
//! - [`dag`]: plain `nodes`/`edges` requests expanded into task records.
//! - [`response`]: compact per-task schedule built from the output records.

pub mod convert;
pub mod dag;
pub mod input;
pub mod output;
pub mod response;

pub use convert::{IdMap, to_graph};
pub use dag::{DagRequest, dag_to_tasks, parse_dag, read_dag};
pub use input::{InputTask, parse_input, read_input};
pub use output::{OutputRecord, build_output, write_output, write_records};
pub use response::{ScheduleResponse, schedule_response, write_response};
