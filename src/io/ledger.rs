//! Completed-task ledger.
//!
//! One branch name per line, no header, append-only. Written after a
//! successful push (not after the optional pull-request step), and read back
//! to offer branches to the revision workflow. The format does not enforce
//! uniqueness; the remote branch guard is what prevents duplicate runs.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::task::CompletedTask;

/// Append-only record of branch names that completed a push.
#[derive(Debug, Clone)]
pub struct CompletedTaskLedger {
    path: PathBuf,
}

impl CompletedTaskLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one branch name. Creates the file (and parents) if missing.
    pub fn append(&self, branch: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create ledger dir {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open ledger {}", self.path.display()))?;
        writeln!(file, "{branch}")
            .with_context(|| format!("append to ledger {}", self.path.display()))?;
        debug!(branch, path = %self.path.display(), "recorded completed task");
        Ok(())
    }

    /// Load all recorded branches, in file order. Missing file means empty.
    pub fn load(&self) -> Result<Vec<CompletedTask>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("read ledger {}", self.path.display()))?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| CompletedTask {
                branch: line.to_string(),
            })
            .collect())
    }
}
