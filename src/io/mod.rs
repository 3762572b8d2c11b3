//! I/O helpers for the pipelines.

pub mod config;
pub mod exec;
pub mod ledger;
pub mod task_table;
pub mod workspace;
