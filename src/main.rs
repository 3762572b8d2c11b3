//! aidd command-line entry points.
//!
//! Thin wrappers over the task and revision pipelines. The heavier
//! interactive front end, issue import, and config authoring live outside
//! this binary; here each subcommand maps directly to one library call.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use aidd::core::task::Task;
use aidd::exit_codes;
use aidd::io::config::{RunConfig, find_config, load_config};
use aidd::io::exec::ProcessExecutor;
use aidd::io::ledger::CompletedTaskLedger;
use aidd::io::task_table::{find_task_table, load_tasks};
use aidd::revise::run_revision;
use aidd::run::{BranchExists, run_task};

const LEDGER_FILE: &str = "completed_task.md";

#[derive(Parser)]
#[command(
    name = "aidd",
    version,
    about = "Run queued development tasks against a repository via a coding agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List tasks loaded from task.md.
    Tasks,
    /// List pushed branches recorded in the completed-task ledger.
    Completed,
    /// Run one task by number: clone, branch, agent, commit, push, PR.
    Run {
        /// Task number from task.md.
        number: u32,
    },
    /// Apply a follow-up instruction to an already-pushed branch.
    Revise {
        /// Branch recorded in the completed-task ledger.
        branch: String,
        /// Revision instruction handed verbatim to the agent.
        instruction: String,
    },
}

fn main() -> ExitCode {
    aidd::logging::init();
    match run() {
        Ok(()) => ExitCode::from(exit_codes::OK as u8),
        Err(err) => {
            eprintln!("{err:#}");
            if err.downcast_ref::<BranchExists>().is_some() {
                ExitCode::from(exit_codes::CONFLICT as u8)
            } else {
                ExitCode::from(exit_codes::INVALID as u8)
            }
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let base = Path::new(".");
    match cli.command {
        Command::Tasks => cmd_tasks(base),
        Command::Completed => cmd_completed(base),
        Command::Run { number } => cmd_run(base, number),
        Command::Revise {
            branch,
            instruction,
        } => cmd_revise(base, &branch, &instruction),
    }
}

fn cmd_tasks(base: &Path) -> Result<()> {
    let tasks = load_base_tasks(base)?;
    for task in &tasks {
        println!("{}. {}", task.number, task.title);
    }
    Ok(())
}

fn cmd_completed(base: &Path) -> Result<()> {
    let ledger = CompletedTaskLedger::new(base.join(LEDGER_FILE));
    for completed in ledger.load()? {
        println!("{}", completed.branch);
    }
    Ok(())
}

fn cmd_run(base: &Path, number: u32) -> Result<()> {
    let cfg = load_base_config(base)?;
    let tasks = load_base_tasks(base)?;
    let task = tasks
        .into_iter()
        .find(|task| task.number == number)
        .ok_or_else(|| anyhow!("task {number} not found in task.md"))?;

    let ledger = CompletedTaskLedger::new(base.join(LEDGER_FILE));
    let outcome = run_task(&cfg, &task, &ProcessExecutor, base, &ledger)?;
    if outcome.skipped {
        println!("task {number}: skipped (skip_run_task)");
    } else {
        println!(
            "task {number}: branch {} (pushed: {}, pr: {})",
            outcome.branch, outcome.pushed, outcome.pr_created
        );
    }
    Ok(())
}

fn cmd_revise(base: &Path, branch: &str, instruction: &str) -> Result<()> {
    let cfg = load_base_config(base)?;
    let outcome = run_revision(&cfg, branch, instruction, &ProcessExecutor, base)?;
    if outcome.skipped {
        println!("revision of {branch}: skipped (skip_revision)");
    } else {
        println!(
            "revision of {branch}: committed (pushed: {}, commented: {})",
            outcome.pushed, outcome.commented
        );
    }
    Ok(())
}

fn load_base_config(base: &Path) -> Result<RunConfig> {
    let path = find_config(base)?;
    load_config(&path).with_context(|| format!("load config {}", path.display()))
}

fn load_base_tasks(base: &Path) -> Result<Vec<Task>> {
    let path = find_task_table(base)?;
    load_tasks(&path).with_context(|| format!("load tasks {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_number() {
        let cli = Cli::parse_from(["aidd", "run", "12"]);
        assert!(matches!(cli.command, Command::Run { number: 12 }));
    }

    #[test]
    fn parse_revise_with_branch_and_instruction() {
        let cli = Cli::parse_from(["aidd", "revise", "aidd/task_12", "tighten the tests"]);
        match cli.command {
            Command::Revise {
                branch,
                instruction,
            } => {
                assert_eq!(branch, "aidd/task_12");
                assert_eq!(instruction, "tighten the tests");
            }
            _ => panic!("expected revise"),
        }
    }

    #[test]
    fn run_requires_a_number() {
        assert!(Cli::try_parse_from(["aidd", "run", "twelve"]).is_err());
    }
}
