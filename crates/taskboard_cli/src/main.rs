//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskboard_core` linkage (`ping`, `version`).
//! - Drive a scripted board session (`demo`) through the public API and
//!   print the resulting tree as text or JSON.

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::{
    default_log_level, dispatch, init_logging, BlockContent, BoardResult, DropOutcome, EntityId,
    LogConfig, NewBlock, NewWorkspace, PlainTextRenderer, StackedLayout, TaskBoard, TodoFields,
    ViewQuery,
};

#[derive(Parser)]
#[command(name = "taskboard", version, about = "Task board core smoke CLI")]
struct Cli {
    /// Log level: trace|debug|info|warn|error. Only used together with `--log-dir`.
    #[arg(long, global = true, requires = "log_dir")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging stays off when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Health check.
    Ping,
    /// Print the core crate version.
    Version,
    /// Run a scripted session: create, select, drag-reorder, delete.
    Demo {
        /// Print the final tree as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let started = LogConfig::new(level, log_dir).and_then(init_logging);
        if let Err(err) = started {
            eprintln!("logging disabled: {err}");
        }
    }

    match cli.command {
        Command::Ping => println!("taskboard_core ping={}", taskboard_core::ping()),
        Command::Version => println!("taskboard_core version={}", taskboard_core::core_version()),
        Command::Demo { json } => {
            if let Err(err) = run_demo(json) {
                eprintln!("demo failed: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

const ROW_HEIGHT: f64 = 24.0;

fn run_demo(json: bool) -> BoardResult<()> {
    let mut board = TaskBoard::new();
    let subscription = board.subscribe(ViewQuery::SelectedTaskItems, |snapshot| {
        info!(
            "event=demo_snapshot module=cli status=ok revision={} items={}",
            snapshot.revision,
            snapshot.children.len()
        );
    });

    let home =
        board.create_workspace(NewWorkspace::new("Home").with_description("Errands and chores"));
    let work = board.create_workspace(NewWorkspace::new("Work"));
    board.select_workspace(home)?;

    let groceries = board.create_block(NewBlock::task(home, "Groceries"))?;
    let chores = board.create_block(NewBlock::task(home, "Chores"))?;
    board.select_task(groceries)?;

    board.create_block(NewBlock::section(groceries, "Produce"))?;
    let apples = board.create_block(NewBlock::todo(groceries, "Apples"))?;
    board.create_block(NewBlock::new(
        groceries,
        BlockContent::Todo(TodoFields {
            title: "Milk".to_string(),
            priority_id: Some("p2".to_string()),
            label_ids: vec!["dairy".to_string()],
            ..TodoFields::default()
        }),
    ))?;
    board.create_block(NewBlock::note(groceries, "Check the coupons first"))?;
    board.create_block(NewBlock::todo(chores, "Laundry"))?;
    let ironing = board.create_block(NewBlock::todo(chores, "Ironing"))?;

    // Drag "Apples" below the note, the last row of the list.
    let ids: Vec<EntityId> = board
        .children_of(groceries)
        .iter()
        .map(|block| block.id)
        .collect();
    let layout = StackedLayout::new(ids.clone(), 0.0, ROW_HEIGHT);
    board.begin_drag(apples)?;
    for step in 1..=ids.len() {
        board.track_pointer(layout.row_center(step.min(ids.len() - 1)) + 1.0, &layout)?;
    }
    let outcome = board.commit_drop()?;
    if let DropOutcome::Moved { from, to } = outcome {
        info!("event=demo_drop module=cli status=ok from={from} to={to}");
    }

    board.delete_block(ironing)?;
    board.unsubscribe(subscription);

    if json {
        print_json(&board, &[home, work]);
    } else {
        print_tree(&board, &[home, work]);
    }
    Ok(())
}

fn print_tree(board: &TaskBoard, workspaces: &[EntityId]) {
    let mut renderer = PlainTextRenderer;
    for workspace_id in workspaces {
        let Some(workspace) = board.store().workspace(*workspace_id) else {
            continue;
        };
        let marker = if workspace.is_selected { "*" } else { " " };
        println!("{marker} {}", workspace.title);
        for task in board.children_of(workspace.id).iter() {
            println!("    {}", dispatch(task, &mut renderer));
            for item in board.children_of(task.id).iter() {
                println!("        {}", dispatch(item, &mut renderer));
            }
        }
    }
}

fn print_json(board: &TaskBoard, workspaces: &[EntityId]) {
    let tree: Vec<serde_json::Value> = workspaces
        .iter()
        .filter_map(|id| board.store().workspace(*id))
        .map(|workspace| {
            let tasks: Vec<serde_json::Value> = board
                .children_of(workspace.id)
                .iter()
                .map(|task| {
                    serde_json::json!({
                        "task": task,
                        "items": board.children_of(task.id).to_vec(),
                    })
                })
                .collect();
            serde_json::json!({ "workspace": workspace, "tasks": tasks })
        })
        .collect();

    match serde_json::to_string_pretty(&tree) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("failed to encode tree: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{run_demo, Cli, Command};
    use clap::error::ErrorKind;
    use clap::Parser;

    #[test]
    fn log_level_without_log_dir_is_rejected() {
        let err = Cli::try_parse_from(["taskboard", "--log-level", "debug", "ping"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn log_level_with_log_dir_is_accepted() {
        let cli = Cli::try_parse_from([
            "taskboard",
            "demo",
            "--log-dir",
            "/tmp/taskboard-logs",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Demo { json: false }));
    }

    #[test]
    fn scripted_demo_runs_to_completion() {
        run_demo(true).unwrap();
    }
}
