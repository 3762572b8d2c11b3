//! Orchestration for running a new task end to end.
//!
//! The pipeline is a strict sequence of external operations, each an abort
//! point: workspace → clone → branch guard → create branch → agent → commit →
//! (push → ledger → pull request). The bracketed tail is conditional on
//! configuration flags; skipping it is a terminal success. No stage is
//! retried; every failure returns a stage-wrapped error value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::command::ExternalCommand;
use crate::core::task::{
    Task, repo_dir_name, task_branch, task_commit_message, task_workspace_label,
};
use crate::io::config::RunConfig;
use crate::io::exec::{CommandExecutor, ExecOutput, ExecRequest, ensure_success};
use crate::io::ledger::CompletedTaskLedger;
use crate::io::workspace::Workspace;

/// The task branch already exists on the remote.
///
/// The sole idempotency guard: a point-in-time check of remote heads before
/// any local branch is created. It does not lock anything, so two concurrent
/// runs of the same task number can still race; that weak guarantee is
/// accepted and matches the remote-side source of truth.
#[derive(Debug)]
pub struct BranchExists {
    pub branch: String,
}

impl fmt::Display for BranchExists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch '{}' already exists", self.branch)
    }
}

impl std::error::Error for BranchExists {}

/// Result of a completed (or skipped) task run.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub branch: String,
    /// True when the skip flag short-circuited the pipeline.
    pub skipped: bool,
    pub pushed: bool,
    pub pr_created: bool,
    pub workspace: Option<PathBuf>,
}

/// Shared invocation plumbing for the task and revision pipelines.
pub(crate) struct Pipeline<'a, E> {
    executor: &'a E,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl<'a, E: CommandExecutor> Pipeline<'a, E> {
    pub(crate) fn new(cfg: &RunConfig, executor: &'a E) -> Self {
        Self {
            executor,
            timeout: Duration::from_secs(cfg.run.command_timeout_secs),
            output_limit_bytes: cfg.run.output_limit_bytes,
        }
    }

    /// Run one command in `workdir` and require success.
    ///
    /// `label` identifies the pipeline stage in any resulting error.
    pub(crate) fn run_checked(
        &self,
        label: &str,
        workdir: &Path,
        command: ExternalCommand,
    ) -> Result<ExecOutput> {
        let request = ExecRequest {
            command,
            workdir: workdir.to_path_buf(),
            timeout: self.timeout,
            output_limit_bytes: self.output_limit_bytes,
        };
        debug!(stage = label, command = %request.command, "running command");
        let output = self
            .executor
            .run(&request)
            .with_context(|| format!("{label}: spawn `{}`", request.command))?;
        ensure_success(label, &request, &output)?;
        Ok(output)
    }
}

/// Execute the full new-task pipeline.
///
/// On successful push the branch is appended to `ledger` before the optional
/// pull-request step, so a push whose PR creation later fails still leaves a
/// valid ledger entry.
#[instrument(skip_all, fields(task = task.number))]
pub fn run_task<E: CommandExecutor>(
    cfg: &RunConfig,
    task: &Task,
    executor: &E,
    base_dir: &Path,
    ledger: &CompletedTaskLedger,
) -> Result<TaskOutcome> {
    let branch = task_branch(task.number);

    if cfg.run.skip_run_task {
        info!(%branch, "skip_run_task set, returning without side effects");
        return Ok(TaskOutcome {
            branch,
            skipped: true,
            pushed: false,
            pr_created: false,
            workspace: None,
        });
    }

    let pipeline = Pipeline::new(cfg, executor);
    let workspace = Workspace::create(base_dir, &task_workspace_label(task.number))
        .context("create workspace")?;

    let clone_cmd = cfg
        .github
        .clone_transport
        .clone_command(&cfg.github.repository, &cfg.github.clone_branch);
    pipeline.run_checked("clone repository", workspace.dir(), clone_cmd)?;
    let repo_dir = workspace.repo_dir(repo_dir_name(&cfg.github.repository));

    // Idempotency guard: refuse to re-run a task whose branch is already on
    // the remote, before creating anything locally.
    let heads = pipeline.run_checked(
        "check remote branch",
        &repo_dir,
        ExternalCommand::new("git").args(["ls-remote", "--heads", "origin", branch.as_str()]),
    )?;
    if !heads.stdout_text().trim().is_empty() {
        warn!(%branch, "remote branch already exists, refusing to re-run");
        return Err(anyhow::Error::new(BranchExists { branch }));
    }

    pipeline.run_checked(
        "create branch",
        &repo_dir,
        ExternalCommand::new("git").args(["checkout", "-b", branch.as_str()]),
    )?;

    let agent_cmd = cfg
        .agent
        .backend
        .invocation(&task.body, cfg.agent.model.as_deref());
    pipeline.run_checked("run agent", &repo_dir, agent_cmd)?;

    let message = task_commit_message(task);
    commit_all(&pipeline, &repo_dir, &message)?;

    let mut pushed = false;
    let mut pr_created = false;
    if cfg.github.push_branch_on_complete {
        pipeline.run_checked(
            "push branch",
            &repo_dir,
            ExternalCommand::new("git").args(["push", "-u", "origin", branch.as_str()]),
        )?;
        pushed = true;
        ledger
            .append(&branch)
            .context("record completed task in ledger")?;

        if cfg.github.create_pr_on_complete {
            let pr_cmd = pr_create_command(cfg, &branch, &message, &task.body);
            pipeline.run_checked("create pull request", &repo_dir, pr_cmd)?;
            pr_created = true;
        }
    }

    info!(%branch, pushed, pr_created, "task pipeline completed");
    Ok(TaskOutcome {
        branch,
        skipped: false,
        pushed,
        pr_created,
        workspace: Some(workspace.dir().to_path_buf()),
    })
}

/// Stage all changes and commit. "Nothing to commit" surfaces as an ordinary
/// commit failure; the pipeline does not distinguish it.
pub(crate) fn commit_all<E: CommandExecutor>(
    pipeline: &Pipeline<'_, E>,
    repo_dir: &Path,
    message: &str,
) -> Result<()> {
    pipeline.run_checked(
        "stage changes",
        repo_dir,
        ExternalCommand::new("git").args(["add", "-A"]),
    )?;
    pipeline.run_checked(
        "commit changes",
        repo_dir,
        ExternalCommand::new("git").args(["commit", "-m", message]),
    )?;
    Ok(())
}

/// Build `gh pr create` for a finished task branch.
fn pr_create_command(cfg: &RunConfig, branch: &str, title: &str, body: &str) -> ExternalCommand {
    let pr_body = format!("【Task Detail】\n{body}");
    let mut cmd = ExternalCommand::new("gh")
        .args(["pr", "create"])
        .args(["--base", cfg.github.clone_branch.as_str()])
        .args(["--head", branch])
        .args(["--title", title])
        .args(["--body", pr_body.as_str()])
        .args(["--label", cfg.issue.label.as_str()]);
    if cfg.github.pr_draft {
        cmd = cmd.arg("--draft");
    }
    cmd
}
