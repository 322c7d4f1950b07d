// tests/common/mod.rs

#![allow(dead_code)]

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::NamedTempFile;

use tileplan::cli::{CliArgs, InputFormat, OutputFormat};

pub type TestResult = Result<(), Box<dyn Error>>;

/// A single-tile platform with the standard profile.
pub const ONE_TILE: &str = r#"
[[tile]]
id = 0
capacity = 1.0
spm_size = 1024
num_lane = 4
"#;

/// Two identical standard tiles.
pub const TWO_TILES: &str = r#"
[[tile]]
id = 0
capacity = 1.0
spm_size = 1024
num_lane = 4

[[tile]]
id = 1
capacity = 1.0
spm_size = 1024
num_lane = 4
"#;

pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A task record with the standard profile and no edges.
pub fn task(id: &str, cost: f64) -> Value {
    json!({
        "taskId": id,
        "computationCost": cost,
        "spm_size": 1024,
        "num_lane": 4,
        "has_bitalu": 0,
        "has_serdiv": 0,
        "has_complexunit": 0,
        "text_offset": "0x0",
        "data_offset": "0x40",
        "total_length": 128,
        "text_length": 64,
        "data_length": 64,
        "output_num": 1,
        "hardwareinfo": "0x1F",
        "hash": format!("hash-{id}"),
    })
}

/// Add a bound `parent → child` edge pair to a document.
pub fn link(doc: &mut [Value], parent: &str, child: &str, dest_address: &str) {
    let var = format!("{parent}_to_{child}");
    for record in doc.iter_mut() {
        if record["taskId"] == parent {
            push(record, "childTasks", json!({
                "taskId": child, "inputIndex": 0, "concat_value": 0, "inputVar": var,
            }));
        }
        if record["taskId"] == child {
            push(record, "parentTasks", json!({
                "taskId": parent, "outputIndex": 1, "dest_address": dest_address,
                "concat_value": 0, "slice_length": "2", "slice_data_type": "4", "outputVar": var,
            }));
        }
    }
}

pub fn push(record: &mut Value, list: &str, entry: Value) {
    match record.get_mut(list).and_then(Value::as_array_mut) {
        Some(items) => items.push(entry),
        None => record[list] = json!([entry]),
    }
}

pub fn write_doc(doc: &[Value]) -> NamedTempFile {
    temp_file(&serde_json::to_string_pretty(doc).unwrap())
}

pub fn args(input: &Path, output: &Path, config: Option<&Path>) -> CliArgs {
    CliArgs {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        config: config.map(PathBuf::from),
        log_level: None,
        dry_run: false,
        input_format: InputFormat::Document,
        output_format: OutputFormat::Document,
    }
}

pub fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}
