//! Typed solver result.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dimension::CapacityDimension;
use super::id::{CandidateId, KpiKey};
use super::row::TargetKind;

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    Optimal,
    /// A feasible assignment was returned but optimality was not proven
    /// (time or gap limit).
    FeasibleSuboptimal,
    /// The solver found no assignment. After a clean pre-check this is an
    /// internal consistency problem.
    Infeasible,
    SolverError,
}

impl SolutionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::FeasibleSuboptimal => "feasible_suboptimal",
            Self::Infeasible => "infeasible",
            Self::SolverError => "solver_error",
        }
    }

    /// True when the solution carries a usable selection.
    #[must_use]
    pub const fn has_selection(self) -> bool {
        matches!(self, Self::Optimal | Self::FeasibleSuboptimal)
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `dimension -> dimension_key -> kpi_key -> achieved`.
pub type AchievedTable = BTreeMap<CapacityDimension, BTreeMap<String, BTreeMap<KpiKey, Decimal>>>;

/// Achieved value against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGap {
    pub dimension: CapacityDimension,
    pub dimension_key: String,
    pub kpi_key: KpiKey,
    pub kind: TargetKind,
    pub target: Decimal,
    pub achieved: Decimal,
    /// Floors: `max(0, target - achieved)`. Goals: `achieved - target`.
    pub gap: Decimal,
}

/// Result of one objective stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub label: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverDiagnostics {
    pub solver: String,
    pub solve_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,
    #[serde(default)]
    pub stages: Vec<StageReport>,
    /// Set when the solver disagrees with a clean pre-check or returns an
    /// assignment that breaks a hard constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Decision record for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationSolution {
    pub status: SolutionStatus,
    pub selected: BTreeSet<CandidateId>,
    pub allocations: BTreeMap<CandidateId, Decimal>,
    pub tokens_used: Decimal,
    pub achieved: AchievedTable,
    pub gaps: Vec<TargetGap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<Decimal>,
    pub diagnostics: SolverDiagnostics,
}

impl OptimizationSolution {
    /// A solution with no selection, for failed or aborted runs.
    pub fn empty(status: SolutionStatus, diagnostics: SolverDiagnostics) -> Self {
        Self {
            status,
            selected: BTreeSet::new(),
            allocations: BTreeMap::new(),
            tokens_used: Decimal::ZERO,
            achieved: BTreeMap::new(),
            gaps: Vec::new(),
            objective_value: None,
            diagnostics,
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: &CandidateId) -> bool {
        self.selected.contains(id)
    }
}
