//! Test-only helpers: scripted command execution and config fixtures.

use std::sync::Mutex;

use anyhow::Result;

use crate::core::agent::AgentBackend;
use crate::core::task::Task;
use crate::core::transport::CloneTransport;
use crate::io::config::{AgentConfig, GithubConfig, IssueConfig, RunConfig, RunFlags};
use crate::io::exec::{CommandExecutor, ExecOutput, ExecRequest};

/// A deterministic config for pipeline tests: ssh transport, gemini agent,
/// push and PR enabled.
pub fn sample_config() -> RunConfig {
    RunConfig {
        github: GithubConfig {
            repository: "octo/widgets".to_string(),
            clone_transport: CloneTransport::Ssh,
            clone_branch: "main".to_string(),
            push_branch_on_complete: true,
            create_pr_on_complete: true,
            pr_draft: false,
        },
        issue: IssueConfig {
            label: "aidd".to_string(),
        },
        agent: AgentConfig {
            backend: AgentBackend::Gemini,
            model: None,
        },
        run: RunFlags::default(),
    }
}

/// A deterministic task for pipeline tests.
pub fn sample_task(number: u32) -> Task {
    Task {
        number,
        title: format!("Task {number} title"),
        body: format!("Task {number} body"),
    }
}

/// One scripted rule: commands whose rendering starts with `prefix` get
/// `output` instead of the default success.
struct Rule {
    prefix: String,
    output: ExecOutput,
}

/// Executor that records every invocation and returns scripted outputs
/// without spawning processes.
///
/// Rules match on the space-joined command rendering; the first matching
/// rule wins, and unmatched commands succeed silently.
#[derive(Default)]
pub struct ScriptedExecutor {
    rules: Vec<Rule>,
    calls: Mutex<Vec<ExecRequest>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to commands starting with `prefix` with `output`.
    pub fn respond(mut self, prefix: &str, output: ExecOutput) -> Self {
        self.rules.push(Rule {
            prefix: prefix.to_string(),
            output,
        });
        self
    }

    /// Fail commands starting with `prefix` with exit code 1.
    pub fn fail_on(self, prefix: &str) -> Self {
        self.respond(prefix, ExecOutput::failed(1, format!("scripted failure: {prefix}")))
    }

    /// Every recorded invocation, in order.
    pub fn calls(&self) -> Vec<ExecRequest> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Space-joined renderings of every recorded invocation, in order.
    pub fn rendered_calls(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|req| req.command.to_string())
            .collect()
    }

    /// True if any recorded command rendering starts with `prefix`.
    pub fn invoked(&self, prefix: &str) -> bool {
        self.rendered_calls()
            .iter()
            .any(|cmd| cmd.starts_with(prefix))
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(request.clone());
        let rendered = request.command.to_string();
        for rule in &self.rules {
            if rendered.starts_with(&rule.prefix) {
                return Ok(rule.output.clone());
            }
        }
        Ok(ExecOutput::ok())
    }
}
