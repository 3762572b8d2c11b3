//! Orchestration for amending an already-pushed task branch.
//!
//! Same backbone as the task pipeline minus the branch guard and ledger
//! write: the branch is assumed to exist remotely and is cloned directly by
//! name; a missing branch surfaces naturally as a clone-stage error. On
//! success with push and PR flags set, the revision instruction is posted as
//! a comment on the branch's pull request instead of opening a new one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, instrument};

use crate::core::command::ExternalCommand;
use crate::core::task::{repo_dir_name, revision_commit_message, revision_workspace_label};
use crate::io::config::RunConfig;
use crate::io::exec::CommandExecutor;
use crate::io::workspace::Workspace;
use crate::run::{Pipeline, commit_all};

/// Result of a completed (or skipped) revision run.
#[derive(Debug, Clone)]
pub struct RevisionOutcome {
    pub branch: String,
    pub skipped: bool,
    pub pushed: bool,
    pub commented: bool,
    pub workspace: Option<PathBuf>,
}

/// Execute the revision pipeline against an existing branch.
#[instrument(skip_all, fields(branch))]
pub fn run_revision<E: CommandExecutor>(
    cfg: &RunConfig,
    branch: &str,
    instruction: &str,
    executor: &E,
    base_dir: &Path,
) -> Result<RevisionOutcome> {
    if cfg.run.skip_revision {
        info!(branch, "skip_revision set, returning without side effects");
        return Ok(RevisionOutcome {
            branch: branch.to_string(),
            skipped: true,
            pushed: false,
            commented: false,
            workspace: None,
        });
    }

    let pipeline = Pipeline::new(cfg, executor);
    let workspace = Workspace::create(base_dir, &revision_workspace_label(branch))
        .context("create workspace")?;

    // Clone the existing task branch directly; there is nothing to guard.
    let clone_cmd = cfg
        .github
        .clone_transport
        .clone_command(&cfg.github.repository, branch);
    pipeline.run_checked("clone branch", workspace.dir(), clone_cmd)?;
    let repo_dir = workspace.repo_dir(repo_dir_name(&cfg.github.repository));

    let agent_cmd = cfg
        .agent
        .backend
        .invocation(instruction, cfg.agent.model.as_deref());
    pipeline.run_checked("run agent", &repo_dir, agent_cmd)?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let message = revision_commit_message(branch, &timestamp);
    commit_all(&pipeline, &repo_dir, &message)?;

    let mut pushed = false;
    let mut commented = false;
    if cfg.github.push_branch_on_complete {
        pipeline.run_checked(
            "push branch",
            &repo_dir,
            ExternalCommand::new("git").args(["push", "-u", "origin", branch]),
        )?;
        pushed = true;

        if cfg.github.create_pr_on_complete {
            pipeline.run_checked(
                "comment on pull request",
                &repo_dir,
                pr_comment_command(branch, instruction),
            )?;
            commented = true;
        }
    }

    info!(branch, pushed, commented, "revision pipeline completed");
    Ok(RevisionOutcome {
        branch: branch.to_string(),
        skipped: false,
        pushed,
        commented,
        workspace: Some(workspace.dir().to_path_buf()),
    })
}

/// Build `gh pr comment` carrying the revision instruction.
fn pr_comment_command(branch: &str, instruction: &str) -> ExternalCommand {
    let body = format!("【Revision Detail】\n{instruction}");
    ExternalCommand::new("gh")
        .args(["pr", "comment", branch])
        .args(["--body", body.as_str()])
}
