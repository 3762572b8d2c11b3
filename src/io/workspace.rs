//! Isolated per-run working directories.
//!
//! Each pipeline run gets a uniquely named directory under `<base>/work/`
//! and threads that path explicitly through every command invocation. The
//! process-wide current directory is never changed, so there is nothing to
//! restore on exit and concurrent runs cannot interfere. Finished workspaces
//! are abandoned, not deleted; they remain inspectable after a run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

/// One run's isolated working directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    /// Create `<base>/work/<label>_<timestamp>`.
    ///
    /// The timestamp carries nanoseconds so nearly-simultaneous runs with the
    /// same label cannot collide. Parent creation is recursive and idempotent.
    pub fn create(base: &Path, label: &str) -> Result<Self> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S_%9f");
        let dir = base.join("work").join(format!("{label}_{timestamp}"));
        fs::create_dir_all(&dir)
            .with_context(|| format!("create workspace {}", dir.display()))?;
        debug!(dir = %dir.display(), "created workspace");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the repository directory a clone will produce inside this
    /// workspace.
    pub fn repo_dir(&self, repo_name: &str) -> PathBuf {
        self.dir.join(repo_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_directory_under_work() {
        let temp = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::create(temp.path(), "task_3").expect("create");
        assert!(ws.dir().is_dir());
        assert!(ws.dir().starts_with(temp.path().join("work")));
        let name = ws.dir().file_name().expect("name").to_string_lossy();
        assert!(name.starts_with("task_3_"));
    }

    #[test]
    fn rapid_runs_get_distinct_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let a = Workspace::create(temp.path(), "task_3").expect("create a");
        let b = Workspace::create(temp.path(), "task_3").expect("create b");
        assert_ne!(a.dir(), b.dir());
    }

    #[test]
    fn repo_dir_joins_repository_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::create(temp.path(), "task_3").expect("create");
        assert_eq!(ws.repo_dir("widgets"), ws.dir().join("widgets"));
    }

    #[test]
    fn create_does_not_change_process_cwd() {
        let before = std::env::current_dir().expect("cwd");
        let temp = tempfile::tempdir().expect("tempdir");
        let _ws = Workspace::create(temp.path(), "task_9").expect("create");
        assert_eq!(std::env::current_dir().expect("cwd"), before);
    }
}
