//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`MilpSolver`] - MILP optimization backend
//! - [`ConstraintSetStore`] - Persistence for compiled constraint sets
//! - [`KpiRegistry`] - KPI catalog lookups
//! - [`OperatorPort`] - Use-cases driven by the CLI

pub mod inbound;
pub mod outbound;

pub use inbound::operator::configuration::{
    ConfigValidationReport, ConfigView, ConfigurationOperator,
};
pub use inbound::operator::port::OperatorPort;
pub use inbound::operator::run::{Interrupt, RunOperator, RunRequest};
pub use inbound::operator::store::StoreOperator;

pub use outbound::registry::KpiRegistry;
pub use outbound::solver::{MilpSolver, RawSolverOutput, RawStatus};
pub use outbound::store::ConstraintSetStore;
