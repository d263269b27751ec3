//! Infrastructure: configuration, wiring and the operator behind the CLI.

pub mod config;
pub mod factory;
pub mod operator;
