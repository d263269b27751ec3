//! Operator implementations for inbound adapters.

pub mod configuration;
pub mod entry;
pub mod run;
pub mod store;

pub use entry::Operator;
