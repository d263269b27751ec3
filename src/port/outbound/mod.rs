//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod registry;
pub mod solver;
pub mod store;
