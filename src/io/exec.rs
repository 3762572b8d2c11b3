//! Executor abstraction over external commands.
//!
//! The [`CommandExecutor`] trait decouples the pipelines from real process
//! spawning. Tests use scripted executors that record invocations and return
//! predetermined outputs without touching the system.
//!
//! Every invocation carries an explicit working directory; the process-global
//! current directory is never mutated, so concurrent runs cannot corrupt each
//! other's relative paths.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::command::ExternalCommand;

/// Parameters for one external-command invocation.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    pub command: ExternalCommand,
    /// Working directory for the child process.
    pub workdir: PathBuf,
    /// Maximum time to wait before killing the child.
    pub timeout: Duration,
    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

/// Captured result of an external command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl ExecOutput {
    /// A successful, silent completion. Useful for scripted executors.
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
            timed_out: false,
        }
    }

    /// A successful completion with the given stdout.
    pub fn with_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::ok()
        }
    }

    /// A failed completion with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
            timed_out: false,
        }
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }
}

/// Abstraction over external-command execution backends.
pub trait CommandExecutor {
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput>;
}

/// An external command exceeded its configured timeout.
///
/// Kept as a distinct, downcastable error so callers can tell a hang apart
/// from an ordinary failure. No retry happens here; retry policy, if any,
/// belongs to the caller.
#[derive(Debug)]
pub struct CommandTimedOut {
    pub command: String,
    pub timeout: Duration,
}

impl fmt::Display for CommandTimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` timed out after {}s",
            self.command,
            self.timeout.as_secs()
        )
    }
}

impl std::error::Error for CommandTimedOut {}

/// Executor that spawns real processes.
pub struct ProcessExecutor;

impl CommandExecutor for ProcessExecutor {
    #[instrument(skip_all, fields(program = %request.command.program, timeout_secs = request.timeout.as_secs()))]
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput> {
        let mut cmd = Command::new(&request.command.program);
        cmd.args(&request.command.args)
            .current_dir(&request.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(command = %request.command, "spawning child process");
        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                error!(err = %e, "failed to spawn command");
                return Err(e).with_context(|| format!("spawn `{}`", request.command));
            }
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;

        let limit = request.output_limit_bytes;
        let stdout_handle = thread::spawn(move || read_stream_limited(stdout, limit));
        let stderr_handle = thread::spawn(move || read_stream_limited(stderr, limit));

        let mut timed_out = false;
        let status = match child
            .wait_timeout(request.timeout)
            .context("wait for command")?
        {
            Some(status) => status,
            None => {
                warn!(
                    timeout_secs = request.timeout.as_secs(),
                    "command timed out, killing"
                );
                timed_out = true;
                child.kill().context("kill command")?;
                child.wait().context("wait command after kill")?
            }
        };

        let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
        let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

        if stdout_truncated > 0 || stderr_truncated > 0 {
            warn!(stdout_truncated, stderr_truncated, "output truncated");
        }

        debug!(exit_code = ?status.code(), timed_out, "command finished");
        Ok(ExecOutput {
            success: status.success(),
            code: status.code(),
            stdout,
            stderr,
            timed_out,
        })
    }
}

/// Check an [`ExecOutput`] for success, producing a stage-attributable error.
///
/// A timeout becomes a downcastable [`CommandTimedOut`]; a nonzero exit
/// becomes an error labelled with `label` plus a stderr excerpt.
pub fn ensure_success(label: &str, request: &ExecRequest, output: &ExecOutput) -> Result<()> {
    if output.timed_out {
        return Err(anyhow::Error::new(CommandTimedOut {
            command: request.command.to_string(),
            timeout: request.timeout,
        })
        .context(format!("{label} timed out")));
    }
    if !output.success {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{label} failed: `{}` exited with {:?}: {}",
            request.command,
            output.code,
            stderr.trim()
        ));
    }
    Ok(())
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command: ExternalCommand) -> ExecRequest {
        ExecRequest {
            command,
            workdir: std::env::temp_dir(),
            timeout: Duration::from_secs(5),
            output_limit_bytes: 10_000,
        }
    }

    #[test]
    fn captures_stdout_of_real_process() {
        let req = request(ExternalCommand::new("echo").arg("hello"));
        let out = ProcessExecutor.run(&req).expect("run echo");
        assert!(out.success);
        assert_eq!(out.stdout_text().trim(), "hello");
    }

    #[test]
    fn reports_nonzero_exit() {
        let req = request(ExternalCommand::new("sh").args(["-c", "echo oops >&2; exit 3"]));
        let out = ProcessExecutor.run(&req).expect("run sh");
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert!(String::from_utf8_lossy(&out.stderr).contains("oops"));
    }

    #[test]
    fn ensure_success_labels_failures() {
        let req = request(ExternalCommand::new("git").args(["push"]));
        let out = ExecOutput::failed(128, "fatal: no upstream");
        let err = ensure_success("push branch", &req, &out).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("push branch"));
        assert!(msg.contains("no upstream"));
    }

    #[test]
    fn ensure_success_surfaces_timeout_as_typed_error() {
        let req = request(ExternalCommand::new("gemini").args(["-p", "x", "-y"]));
        let out = ExecOutput {
            timed_out: true,
            success: false,
            code: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
        };
        let err = ensure_success("run agent", &req, &out).unwrap_err();
        assert!(err.downcast_ref::<CommandTimedOut>().is_some());
    }

    #[test]
    fn kills_after_timeout() {
        let req = ExecRequest {
            command: ExternalCommand::new("sleep").arg("5"),
            workdir: std::env::temp_dir(),
            timeout: Duration::from_millis(100),
            output_limit_bytes: 1000,
        };
        let out = ProcessExecutor.run(&req).expect("run sleep");
        assert!(out.timed_out);
    }
}
