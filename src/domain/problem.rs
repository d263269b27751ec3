//! The engine-ready optimization problem.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::compiled::CompiledConstraintSet;
use super::id::{CandidateId, IdPair, KpiKey};
use super::model::{MilpModel, Objective, VarIndex};
use super::scenario::{ObjectiveMode, Scenario};

/// Non-blocking findings raised while building a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemWarning {
    /// Both a KPI and a KPI it causally feeds carry objective weight.
    RedundantWeighting { input: KpiKey, output: KpiKey },
    /// A contribution to a KPI that is neither North Star nor Strategic.
    IgnoredContribution { candidate: CandidateId, kpi: KpiKey },
    /// A rule names a candidate that is not in the pool; the rule is skipped.
    UnknownCandidate { rule: String, id: CandidateId },
}

impl fmt::Display for ProblemWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedundantWeighting { input, output } => write!(
                f,
                "KPI '{input}' feeds into '{output}'; weighting both counts the same effect twice"
            ),
            Self::IgnoredContribution { candidate, kpi } => write!(
                f,
                "candidate {candidate} contributes to '{kpi}', which is not a North Star or Strategic KPI; ignored in objectives"
            ),
            Self::UnknownCandidate { rule, id } => {
                write!(f, "{rule} references unknown candidate {id}; skipped")
            }
        }
    }
}

/// Binary variable linked to a synergy pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynergyVar {
    pub pair: IdPair,
    pub var: VarIndex,
}

/// A scenario, compiled constraint set and candidate pool, translated into a
/// MILP with ordered objective stages.
///
/// Variable `i` for `i < candidates.len()` is the selection binary of
/// `candidates[i]`. Candidates are sorted by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationProblem {
    pub scenario: Scenario,
    pub compiled: CompiledConstraintSet,
    pub candidates: Vec<Candidate>,
    pub north_star: Option<KpiKey>,
    /// KPI whose stage value is reported as the objective.
    pub primary_kpi: Option<KpiKey>,
    /// `min(total_capacity, cap[all])` when either exists.
    pub global_capacity: Option<Decimal>,
    /// Resolved per-KPI scales (weighted mode only).
    pub normalization: BTreeMap<KpiKey, Decimal>,
    pub model: MilpModel,
    pub stages: Vec<Objective>,
    /// Index into `stages` of the stage reported as `objective_value`.
    pub primary_stage: usize,
    pub synergy_vars: Vec<SynergyVar>,
    pub warnings: Vec<ProblemWarning>,
}

impl OptimizationProblem {
    #[must_use]
    pub fn objective_mode(&self) -> ObjectiveMode {
        self.scenario.objective
    }

    /// Position of a candidate in the pool, which is also its variable index.
    #[must_use]
    pub fn index_of(&self, id: &CandidateId) -> Option<usize> {
        self.candidates
            .binary_search_by(|c| c.id.cmp(id))
            .ok()
    }

    #[must_use]
    pub fn candidate(&self, id: &CandidateId) -> Option<&Candidate> {
        self.index_of(id).map(|i| &self.candidates[i])
    }

    #[must_use]
    pub fn contains(&self, id: &CandidateId) -> bool {
        self.index_of(id).is_some()
    }

    /// Total token cost of a set of candidates; unknown ids count as zero.
    pub fn token_cost<'a>(&self, ids: impl IntoIterator<Item = &'a CandidateId>) -> Decimal {
        ids.into_iter()
            .filter_map(|id| self.candidate(id))
            .map(|c| c.token_cost)
            .sum()
    }
}
