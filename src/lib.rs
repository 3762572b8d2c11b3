//! AI-driven development task pipeline.
//!
//! This crate turns a queued task (number, title, instruction body) into a
//! committed, optionally pushed and pull-requested change on a target
//! repository, produced by an external coding agent. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (naming rules, command builders,
//!   transport/agent variants). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (process execution, workspaces,
//!   task table, ledger, config). Isolated to enable scripted fakes in tests.
//!
//! Orchestration modules ([`run`], [`revise`]) coordinate core logic with I/O
//! to implement the two pipelines consumed by the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod revise;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
