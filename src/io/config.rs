//! Pipeline configuration (`aidd.toml`).
//!
//! Read-only to the pipelines. Unknown transport/agent variants fail at parse
//! time, before any side effect.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::agent::AgentBackend;
use crate::core::transport::CloneTransport;

/// Locations searched for the config file, relative to the invocation base.
const SEARCH_PATHS: [&str; 2] = ["aidd.toml", "src/aidd.toml"];

/// Full pipeline configuration (TOML).
///
/// This file is edited by humans and must remain stable. Optional knobs
/// default to sensible values; repository and label have no defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfig {
    pub github: GithubConfig,
    pub issue: IssueConfig,
    pub agent: AgentConfig,
    #[serde(default)]
    pub run: RunFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GithubConfig {
    /// Target repository as `owner/name`.
    pub repository: String,
    pub clone_transport: CloneTransport,
    /// The repository's mainline branch, cloned and used as PR base.
    #[serde(default = "default_clone_branch")]
    pub clone_branch: String,
    #[serde(default)]
    pub push_branch_on_complete: bool,
    #[serde(default)]
    pub create_pr_on_complete: bool,
    #[serde(default)]
    pub pr_draft: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueConfig {
    /// Label applied to imported issues and created pull requests.
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentConfig {
    pub backend: AgentBackend,
    /// Explicit model override passed to the agent CLI.
    #[serde(default)]
    pub model: Option<String>,
}

/// Execution knobs, all defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunFlags {
    /// Short-circuit `run` to a no-op success before any side effect.
    pub skip_run_task: bool,
    /// Short-circuit `revise` the same way.
    pub skip_revision: bool,
    /// Wall-clock budget for each external command.
    pub command_timeout_secs: u64,
    /// Truncate captured command output beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for RunFlags {
    fn default() -> Self {
        Self {
            skip_run_task: false,
            skip_revision: false,
            command_timeout_secs: 60 * 60,
            output_limit_bytes: 100_000,
        }
    }
}

fn default_clone_branch() -> String {
    "main".to_string()
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        let repo = self.github.repository.trim();
        if repo.is_empty() {
            return Err(anyhow!("github.repository must be set"));
        }
        match repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {}
            _ => return Err(anyhow!("github.repository must be `owner/name`")),
        }
        if self.github.clone_branch.trim().is_empty() {
            return Err(anyhow!("github.clone_branch must not be empty"));
        }
        if self.issue.label.trim().is_empty() {
            return Err(anyhow!("issue.label must not be empty"));
        }
        if self.run.command_timeout_secs == 0 {
            return Err(anyhow!("run.command_timeout_secs must be > 0"));
        }
        if self.run.output_limit_bytes == 0 {
            return Err(anyhow!("run.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Find the config file under `base`, trying `aidd.toml` then `src/aidd.toml`.
pub fn find_config(base: &Path) -> Result<PathBuf> {
    for rel in SEARCH_PATHS {
        let candidate = base.join(rel);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(anyhow!("no aidd.toml found in search paths"))
}

/// Load and validate config from a TOML file.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
