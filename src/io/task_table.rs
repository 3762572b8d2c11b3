//! Task table (`task.md`) parsing.
//!
//! The table is produced by the issue-import step: a Markdown table with a
//! 2-line header/separator preamble followed by one row per task,
//! `| <number> | <title> | <body> |`. Newlines in the body arrive as literal
//! `<br>` markers and pipes arrive pre-escaped, so a row always splits into
//! at least 4 cells; fewer is a malformed row.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::task::Task;

/// Locations searched for the task table, relative to `base`.
const SEARCH_PATHS: [&str; 2] = ["task.md", "src/task.md"];

/// Find the task table under `base`, trying `task.md` then `src/task.md`.
pub fn find_task_table(base: &Path) -> Result<PathBuf> {
    for rel in SEARCH_PATHS {
        let candidate = base.join(rel);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(anyhow!("no task.md found in search paths"))
}

/// Load all tasks from a task table file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let tasks = parse_tasks(&contents)?;
    debug!(count = tasks.len(), "loaded tasks");
    Ok(tasks)
}

/// Parse task table contents. Line numbers in errors are 1-based.
pub fn parse_tasks(contents: &str) -> Result<Vec<Task>> {
    let mut tasks = Vec::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line_num = idx + 1;
        // Header and separator preamble.
        if line_num <= 2 {
            continue;
        }
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        // Leading and trailing pipes yield empty first/last cells, so a
        // well-formed row splits into at least 4 cells.
        let cells: Vec<&str> = line.split('|').collect();
        if cells.len() < 4 {
            return Err(anyhow!("invalid table row at line {line_num}"));
        }

        let number: u32 = cells[1]
            .trim()
            .parse()
            .with_context(|| format!("invalid number at line {line_num}"))?;
        let title = cells[2].trim().to_string();
        let body = cells[3].trim().replace("<br>", "\n");

        tasks.push(Task {
            number,
            title,
            body,
        });
    }

    Ok(tasks)
}
