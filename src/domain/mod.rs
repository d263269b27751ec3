//! Pure planning types: rows, rules, compiled sets, problems and solutions.
//!
//! Nothing in this module performs I/O.

pub mod candidate;
pub mod compiled;
pub mod dimension;
pub mod error;
pub mod feasibility;
pub mod id;
pub mod kpi;
pub mod model;
pub mod outcome;
pub mod problem;
pub mod row;
pub mod rule;
pub mod scenario;
pub mod solution;
pub mod validation;

pub use candidate::{Candidate, DimensionAttributes};
pub use compiled::{Bundle, CompiledConstraintSet, CompiledRule, TargetSpec};
pub use dimension::{CapacityDimension, Dimension};
pub use error::DomainError;
pub use feasibility::{FeasibilityDetails, FeasibilityIssue, FeasibilityReport, IssueCode, RuleRef};
pub use id::{CandidateId, ConstraintSetKey, IdPair, KpiKey};
pub use kpi::{KpiCatalog, KpiDefinition, KpiLevel};
pub use model::{MilpModel, Objective, ObjectiveSense};
pub use outcome::RunOutcome;
pub use problem::{OptimizationProblem, ProblemWarning};
pub use row::{ConstraintRow, ConstraintType, RowIdentity, TargetKind, TargetRow};
pub use rule::{ConstraintRule, Sourced, TargetRule};
pub use scenario::{ObjectiveMode, Scenario};
pub use solution::{OptimizationSolution, SolutionStatus, SolverDiagnostics, TargetGap};
pub use validation::{Severity, Validated, ValidationCode, ValidationMessage};
