//! Factory functions that wire adapters from configuration.
//!
//! - [`solver`] - MILP backend and run loop construction
//! - [`store`] - Constraint set store construction

pub mod solver;
pub mod store;

pub use solver::{build_runner, build_solver};
pub use store::build_store;
