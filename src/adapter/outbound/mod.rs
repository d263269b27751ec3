//! Outbound adapters (driven side).

pub mod solver;
pub mod store;
