//! Command-line adapter.
//!
//! [`dispatch::run`] sends a parsed [`command::Cli`] to its handler and maps
//! the outcome to a process exit code.

pub mod check;
pub mod command;
pub mod compile;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod output;
pub mod paths;
mod prepare;
pub mod sets;
pub mod solve;
