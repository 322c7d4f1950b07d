// src/lib.rs

pub mod cli;
pub mod config;
pub mod document;
pub mod errors;
pub mod graph;
pub mod heft;
pub mod logging;
pub mod types;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, InputFormat, OutputFormat};
use crate::config::{ConfigFile, resolve_config};
use crate::document::{
    IdMap, InputTask, build_output, dag_to_tasks, read_dag, read_input, schedule_response,
    to_graph, write_output, write_response,
};
use crate::graph::TaskGraph;
use crate::heft::Schedule;

/// A scheduled document: graph, id mapping and the final schedule.
#[derive(Debug, Clone)]
pub struct Plan {
    pub graph: TaskGraph,
    pub ids: IdMap,
    pub schedule: Schedule,
}

/// Schedule an already-parsed document on the configured platform.
pub fn plan(doc: &[InputTask], cfg: &ConfigFile) -> errors::Result<Plan> {
    let (graph, ids) = to_graph(doc, cfg.tiles())?;
    let schedule = heft::schedule(&graph, cfg.schedule_options())?;
    Ok(Plan {
        graph,
        ids,
        schedule,
    })
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution
/// - document (or DAG request) parsing and id conversion
/// - HEFT scheduling
/// - output writing in the selected format (skipped with `--dry-run`)
pub fn run(args: CliArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let cfg = resolve_config(args.config.as_deref(), &cwd).context("loading platform config")?;

    let doc = match args.input_format {
        InputFormat::Document => read_input(&args.input)
            .with_context(|| format!("reading task document {:?}", args.input))?,
        InputFormat::Dag => {
            let request = read_dag(&args.input)
                .with_context(|| format!("reading DAG request {:?}", args.input))?;
            dag_to_tasks(&request.dag)?
        }
    };
    info!(tasks = doc.len(), tiles = cfg.tiles().len(), "scheduling task document");

    let plan = plan(&doc, &cfg)?;

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(());
    }

    let records = build_output(&doc, &plan.graph, &plan.schedule)?;
    match args.output_format {
        OutputFormat::Document => write_output(&args.output, &records)
            .with_context(|| format!("writing scheduled document {:?}", args.output))?,
        OutputFormat::Schedule => write_response(&args.output, &schedule_response(&records))
            .with_context(|| format!("writing schedule response {:?}", args.output))?,
    }

    debug!(output = %args.output.display(), "run complete");
    Ok(())
}

fn task_label(ids: &IdMap, task: usize) -> &str {
    ids.name(task).unwrap_or("?")
}

/// Dry-run output: ranks, per-tile timelines and unplaced tasks.
fn print_dry_run(plan: &Plan) {
    let schedule = &plan.schedule;

    println!("tileplan dry-run");
    println!("  tasks = {}", plan.graph.task_count());
    println!("  tiles = {}", plan.graph.tiles().len());
    println!("  makespan = {}", schedule.makespan());
    println!();

    println!("ranks:");
    for (position, &(task, rank)) in schedule.ranks().iter().enumerate() {
        let level = match schedule.ranking.level_of(task) {
            Some(level) => level.to_string(),
            None => "-".to_string(),
        };
        println!(
            "  #{position:<3} {} (task {task}) rank = {rank:.4} level = {level}",
            task_label(&plan.ids, task)
        );
    }
    println!();

    println!("timelines:");
    for (tile, events) in &schedule.events {
        println!("  tile {tile}:");
        if events.is_empty() {
            println!("      (idle)");
        }
        for event in events {
            println!(
                "      [{:>10.4}, {:>10.4})  {}",
                event.start,
                event.finish,
                task_label(&plan.ids, event.task)
            );
        }
    }

    if !schedule.unplaced.is_empty() {
        println!();
        println!("unplaced:");
        for (task, reason) in &schedule.unplaced {
            println!("  - {}: {reason}", task_label(&plan.ids, *task));
        }
    }

    debug!("dry-run complete (no output written)");
}
