//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`operator`]: configuration, storage and run use-cases for the CLI

pub mod operator;
