//! Subcommand implementations
//!
//! Each `run` returns `Ok(false)` when the command finished but reported
//! failures, so the binary can pick the exit code.

pub mod guides;
pub mod reflect;
