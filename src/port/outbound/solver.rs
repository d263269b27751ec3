//! Solver port for mixed-integer linear programming.
//!
//! The engine never reimplements a MILP solver. Backends (HiGHS, CBC, ...)
//! implement [`MilpSolver`] and solve one objective stage at a time over a
//! solver-agnostic [`MilpModel`]; the application layer sequences stages.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::model::{MilpModel, Objective};
use crate::error::Result;

/// Mixed-integer linear programming backend.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; runs execute on blocking worker
/// threads.
pub trait MilpSolver: Send + Sync {
    /// Return the solver name for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Optimize `objective` subject to every constraint in `model`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backend cannot be driven at all.
    /// Infeasible or unbounded models are reported through
    /// [`RawSolverOutput::status`].
    fn solve(&self, model: &MilpModel, objective: &Objective) -> Result<RawSolverOutput>;
}

/// Termination status reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawStatus {
    /// Proven optimal.
    Optimal,
    /// A time or gap limit stopped the search with an incumbent.
    LimitReached,
    Infeasible,
    Unbounded,
    /// The backend failed.
    Failed(String),
}

impl RawStatus {
    /// True when values are present and usable.
    #[must_use]
    pub const fn has_values(&self) -> bool {
        matches!(self, Self::Optimal | Self::LimitReached)
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => f.write_str("optimal"),
            Self::LimitReached => f.write_str("limit_reached"),
            Self::Infeasible => f.write_str("infeasible"),
            Self::Unbounded => f.write_str("unbounded"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Raw output of one solve call.
#[derive(Debug, Clone)]
pub struct RawSolverOutput {
    pub status: RawStatus,
    /// One value per model variable; empty when `status` has no values.
    pub values: Vec<Decimal>,
    pub objective: Option<Decimal>,
    pub elapsed: Duration,
    pub iterations: Option<u64>,
}

impl RawSolverOutput {
    /// Output without an assignment.
    #[must_use]
    pub fn without_values(status: RawStatus, elapsed: Duration) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
            elapsed,
            iterations: None,
        }
    }
}
