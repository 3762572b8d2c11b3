//! Stable exit codes for aidd CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config/table/arguments or a pipeline error.
pub const INVALID: i32 = 1;
/// `aidd run` refused to start: the task branch already exists remotely.
pub const CONFLICT: i32 = 2;
