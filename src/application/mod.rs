//! Application services (use cases).
//!
//! These services sequence the pure domain logic: rows are validated and
//! compiled, compiled sets become problems, problems are checked, solved
//! and mapped back into typed solutions.

pub mod builder;
pub mod compile;
pub mod feasibility;
mod formulation;
pub mod mapper;
pub mod runner;
pub mod solve;
pub mod validate;

pub use builder::build;
pub use compile::{compile, Compilation};
pub use feasibility::check;
pub use mapper::{map, map_staged};
pub use crate::domain::outcome::RunOutcome;
pub use runner::PlanRunner;
pub use solve::{solve_staged, StagedOutput};
pub use validate::{validate_constraint_row, validate_target_row};
