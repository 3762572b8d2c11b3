//! Coding-agent backends.
//!
//! Each backend owns its invocation shape. The instruction is passed verbatim
//! as a direct argument (embedded newlines included); an optional model
//! override is appended as a flag, except for Codex, whose argument parser is
//! positional-sensitive and requires the model flag before the instruction.
//!
//! Invoking the built command may arbitrarily mutate files in the workspace;
//! the pipelines treat it as an opaque, blocking, all-or-nothing step.

use serde::{Deserialize, Serialize};

use crate::core::command::ExternalCommand;

/// Which coding-agent CLI executes the task instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentBackend {
    Gemini,
    Qwen,
    Claude,
    Codex,
}

impl AgentBackend {
    /// Build the agent invocation for `instruction` with an optional model
    /// override.
    pub fn invocation(self, instruction: &str, model: Option<&str>) -> ExternalCommand {
        match self {
            AgentBackend::Gemini => append_model(
                ExternalCommand::new("gemini").args(["-p", instruction, "-y"]),
                "-m",
                model,
            ),
            AgentBackend::Qwen => append_model(
                ExternalCommand::new("qwen").args(["-p", instruction, "-y"]),
                "-m",
                model,
            ),
            AgentBackend::Claude => append_model(
                ExternalCommand::new("claude")
                    .args(["-p", instruction])
                    .arg("--dangerously-skip-permissions"),
                "--model",
                model,
            ),
            AgentBackend::Codex => {
                // `codex exec` takes the prompt positionally; options must
                // precede it, so the model flag is interleaved, not appended.
                let mut cmd = ExternalCommand::new("codex").args(["exec", "--full-auto"]);
                if let Some(model) = model {
                    cmd = cmd.args(["-m", model]);
                }
                cmd.arg(instruction)
            }
        }
    }
}

fn append_model(cmd: ExternalCommand, flag: &str, model: Option<&str>) -> ExternalCommand {
    match model {
        Some(model) => cmd.args([flag, model]),
        None => cmd,
    }
}
