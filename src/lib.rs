//! Portfolio selection under planning constraints.
//!
//! Planners author constraints and KPI targets as flat rows. This crate
//! validates those rows, compiles them into deterministic constraint sets,
//! checks a scenario for conflicts before any solver runs, translates it
//! into a mixed-integer program with staged objectives, solves it with
//! HiGHS, and maps the assignment back into a typed decision record.
//!
//! # Architecture
//!
//! - [`domain`] - Pure types: rows, rules, compiled sets, problems, solutions
//! - [`port`] - Traits for the solver backend, the set store and the KPI registry
//! - [`application`] - Use cases: validate, compile, check, build, solve, map
//! - [`adapter`] - HiGHS backend, JSON and in-memory stores, the CLI
//! - [`infrastructure`] - Configuration and wiring
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use portfolio_solver::application::{build, check};
//! use portfolio_solver::domain::{
//!     Candidate, CompiledConstraintSet, ConstraintSetKey, KpiCatalog, KpiDefinition, KpiLevel,
//!     Scenario,
//! };
//! use rust_decimal_macros::dec;
//!
//! let catalog = KpiCatalog::new([KpiDefinition::new("revenue", Some(KpiLevel::NorthStar))])?;
//! let set = CompiledConstraintSet::new(ConstraintSetKey::new("base", "default"));
//! let pool = vec![Candidate::new("A", dec!(100)).with_contribution("revenue", dec!(80))];
//!
//! let problem = build(&Scenario::new("base"), &set, &pool, &catalog)?;
//! assert!(check(&problem).is_feasible);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
