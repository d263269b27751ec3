//! Outcome of one planning run.

use super::feasibility::FeasibilityReport;
use super::solution::OptimizationSolution;

/// Result of a run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The pre-solve check found errors; the solver was never invoked.
    Rejected(FeasibilityReport),
    Solved {
        report: FeasibilityReport,
        solution: OptimizationSolution,
    },
}

impl RunOutcome {
    #[must_use]
    pub fn report(&self) -> &FeasibilityReport {
        match self {
            Self::Rejected(report) | Self::Solved { report, .. } => report,
        }
    }

    #[must_use]
    pub fn solution(&self) -> Option<&OptimizationSolution> {
        match self {
            Self::Rejected(_) => None,
            Self::Solved { solution, .. } => Some(solution),
        }
    }
}
