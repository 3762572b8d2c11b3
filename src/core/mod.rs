//! Deterministic, pure logic shared by the pipelines.
//!
//! Core modules must be free of I/O side effects. They build command values
//! and derive names from in-memory data, suitable for direct assertion in
//! tests.

pub mod agent;
pub mod command;
pub mod task;
pub mod transport;
