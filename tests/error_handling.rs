// tests/error_handling.rs

mod common;

use common::{ONE_TILE, TestResult, args, link, task, temp_file, write_doc};
use tileplan::cli::InputFormat;
use tileplan::config::load_and_validate;
use tileplan::errors::TileplanError;
use tileplan::heft::{ScheduleError, ScheduleOptions, UnplaceableReason, schedule};
use tileplan::types::CyclePolicy;
use tileplan::{plan, run};
use tileplan_test_utils::builders::{GraphBuilder, TaskBuilder, TileBuilder};
use tileplan_test_utils::init_tracing;

#[test]
fn cycle_is_reported_with_its_members() {
    init_tracing();

    let graph = GraphBuilder::new()
        .tasks(3, 1.0)
        .connect(0, 1)
        .connect(1, 2)
        .connect(2, 1)
        .tile(TileBuilder::new(0))
        .build();

    match schedule(&graph, ScheduleOptions::default()) {
        Err(ScheduleError::Cycle { tasks }) => assert_eq!(tasks, vec![1, 2]),
        other => panic!("Expected cycle error, got: {:?}", other),
    }
}

#[test]
fn cycle_under_warn_policy_leaves_members_unplaced() -> TestResult {
    init_tracing();

    let graph = GraphBuilder::new()
        .tasks(3, 1.0)
        .connect(0, 1)
        .connect(1, 0)
        .tile(TileBuilder::new(0))
        .build();

    let options = ScheduleOptions {
        on_cycle: CyclePolicy::Warn,
        ..ScheduleOptions::default()
    };

    // Ranking survives, but under the default unplaceable policy the blocked
    // cycle members are fatal.
    match schedule(&graph, options) {
        Err(ScheduleError::Unplaceable {
            reason: UnplaceableReason::BlockedBy(_),
            ..
        }) => {}
        other => panic!("Expected blocked task, got: {:?}", other),
    }
    Ok(())
}

#[test]
fn unplaceable_task_is_fatal_by_default() {
    init_tracing();

    let graph = GraphBuilder::new()
        .task(TaskBuilder::new(1.0).with_bitalu())
        .tile(TileBuilder::new(0))
        .build();

    let err = schedule(&graph, ScheduleOptions::default()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Unplaceable {
            task: 0,
            reason: UnplaceableReason::NoMatchingTile
        }
    );
    assert!(err.to_string().contains("task 0 cannot be placed"));
}

#[test]
fn config_without_tiles_is_rejected() {
    let file = temp_file("[scheduler]\nunplaceable = \"skip\"\n");

    match load_and_validate(file.path()) {
        Err(TileplanError::ConfigError(msg)) => assert!(msg.contains("[[tile]]")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_toml_returns_toml_error() {
    let file = temp_file("[[tile]\ncapacity = ");
    let result = load_and_validate(file.path());
    assert!(matches!(result, Err(TileplanError::TomlError(_))));
}

#[test]
fn duplicate_document_ids_are_rejected() {
    let doc = vec![task("a", 1.0), task("a", 2.0)];
    let parsed = tileplan::document::parse_input(&serde_json::to_string(&doc).unwrap()).unwrap();
    let cfg = tileplan::config::ConfigFile::builtin();

    match plan(&parsed, &cfg) {
        Err(TileplanError::Document(msg)) => assert!(msg.contains("duplicate taskId")),
        other => panic!("Expected document error, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn unreadable_input_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_file(ONE_TILE);
    let missing = dir.path().join("missing.json");
    let output = dir.path().join("out.json");

    let err = run(args(&missing, &output, Some(config.path()))).unwrap_err();
    assert!(format!("{err:?}").contains("reading task document"));
    assert!(!output.exists());
}

#[test]
fn invalid_json_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_file(ONE_TILE);
    let input = temp_file("[{\"taskId\": \"a\"");
    let output = dir.path().join("out.json");

    assert!(run(args(input.path(), &output, Some(config.path()))).is_err());
}

#[test]
fn unwritable_output_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_file(ONE_TILE);
    let mut doc = vec![task("a", 1.0), task("b", 1.0)];
    link(&mut doc, "a", "b", "0x100");
    let input = write_doc(&doc);
    let output = dir.path().join("no-such-dir").join("out.json");

    let err = run(args(input.path(), &output, Some(config.path()))).unwrap_err();
    assert!(format!("{err:?}").contains("writing scheduled document"));
}

#[test]
fn dag_request_with_dangling_edge_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = temp_file(ONE_TILE);
    let input = temp_file(
        r#"{"dag": {"nodes": [{"id": "a"}], "edges": [{"fromNode": "a", "toNode": "ghost", "dataSize": 8}]}}"#,
    );
    let output = dir.path().join("out.json");

    let mut cli = args(input.path(), &output, Some(config.path()));
    cli.input_format = InputFormat::Dag;
    let err = run(cli).unwrap_err();

    assert!(format!("{err:?}").contains("unknown node 'ghost'"));
    assert!(!output.exists());
}
