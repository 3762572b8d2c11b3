//! Task data and deterministic naming rules.
//!
//! Branch names, commit messages, and workspace labels are pure functions of
//! the task so that re-runs derive identical names. The branch name is what
//! the remote-side idempotency guard keys on.

use serde::{Deserialize, Serialize};

/// One queued unit of work, loaded from the task table.
///
/// Identity is `number`; `body` is the natural-language instruction handed
/// verbatim to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub number: u32,
    pub title: String,
    pub body: String,
}

/// A branch that completed a push, as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    pub branch: String,
}

/// Branch created for a new task: `aidd/task_<number>`.
pub fn task_branch(number: u32) -> String {
    format!("aidd/task_{number}")
}

/// Commit message for a new task: `aidd: [task_<number>] <title>`.
pub fn task_commit_message(task: &Task) -> String {
    format!("aidd: [task_{}] {}", task.number, task.title)
}

/// Commit message for a revision: `aidd: [<branch>_<timestamp>] Revision`.
pub fn revision_commit_message(branch: &str, timestamp: &str) -> String {
    format!("aidd: [{branch}_{timestamp}] Revision")
}

/// Workspace directory label for a new task run.
pub fn task_workspace_label(number: u32) -> String {
    format!("task_{number}")
}

/// Workspace directory label for a revision run.
///
/// Branch names contain `/`, which must not introduce path components.
pub fn revision_workspace_label(branch: &str) -> String {
    format!("revision_{}", branch.replace('/', "_"))
}

/// The repository directory a clone produces, from an `owner/name` id.
pub fn repo_dir_name(repository: &str) -> &str {
    match repository.split_once('/') {
        Some((_, name)) => name,
        None => repository,
    }
}
