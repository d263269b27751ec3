//! Pre-solve feasibility report.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dimension::CapacityDimension;
use super::id::{CandidateId, IdPair, KpiKey};

/// Reference to the rule an issue was derived from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleRef {
    CapacityFloor { dimension: CapacityDimension, key: String },
    CapacityCap { dimension: CapacityDimension, key: String },
    Mandatory { id: CandidateId },
    Bundle { bundle_key: String },
    ExcludeInitiative { id: CandidateId },
    ExcludePair { pair: IdPair },
    RequirePrereq { dependent: CandidateId },
    SynergyBonus { pair: IdPair },
    Target { dimension: CapacityDimension, key: String, kpi: KpiKey },
    TotalCapacity,
    Candidate { id: CandidateId },
}

impl fmt::Display for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityFloor { dimension, key } => {
                write!(f, "capacity_floor[{}]", dimension.slice_label(key))
            }
            Self::CapacityCap { dimension, key } => {
                write!(f, "capacity_cap[{}]", dimension.slice_label(key))
            }
            Self::Mandatory { id } => write!(f, "mandatory[{id}]"),
            Self::Bundle { bundle_key } => write!(f, "bundle_all_or_nothing[{bundle_key}]"),
            Self::ExcludeInitiative { id } => write!(f, "exclude_initiative[{id}]"),
            Self::ExcludePair { pair } => write!(f, "exclude_pair[{pair}]"),
            Self::RequirePrereq { dependent } => write!(f, "require_prereq[{dependent}]"),
            Self::SynergyBonus { pair } => write!(f, "synergy_bonus[{pair}]"),
            Self::Target {
                dimension,
                key,
                kpi,
            } => write!(f, "target[{}:{kpi}]", dimension.slice_label(key)),
            Self::TotalCapacity => f.write_str("total_capacity"),
            Self::Candidate { id } => write!(f, "candidate[{id}]"),
        }
    }
}

/// Class of a feasibility finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    MandatoryExcluded,
    ExcludedPairForced,
    BundleConflict,
    PrerequisiteCycle,
    UnknownCandidate,
    ForcedSelectionExcluded,
    FloorsExceedCapacity,
    FloorExceedsCap,
    ForcedCostExceedsCapacity,
    FloorUnreachable,
    TargetUnreachable,
    DuplicateBundleKey,
    BundleNeverSelectable,
    SynergyWithExcluded,
    BuilderWarning,
}

/// One error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityIssue {
    pub code: IssueCode,
    pub message: String,
    pub rules: Vec<RuleRef>,
}

impl FeasibilityIssue {
    pub fn new(code: IssueCode, message: impl Into<String>, rules: Vec<RuleRef>) -> Self {
        Self {
            code,
            message: message.into(),
            rules,
        }
    }
}

impl fmt::Display for FeasibilityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.rules.is_empty() {
            let names: Vec<String> = self.rules.iter().map(ToString::to_string).collect();
            write!(f, " ({})", names.join(", "))?;
        }
        Ok(())
    }
}

/// Supporting numbers computed during the check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityDetails {
    pub global_capacity: Option<Decimal>,
    pub mandatory_tokens: Decimal,
    /// Mandatory candidates plus everything they pull in through
    /// prerequisites and bundles.
    pub forced_selection: BTreeSet<CandidateId>,
    pub forced_tokens: Decimal,
    /// Pair partners of forced candidates; they can never be selected.
    pub forced_exclusions: BTreeSet<CandidateId>,
    pub floor_totals: BTreeMap<CapacityDimension, Decimal>,
}

/// Result of a feasibility check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub is_feasible: bool,
    pub errors: Vec<FeasibilityIssue>,
    pub warnings: Vec<FeasibilityIssue>,
    pub details: FeasibilityDetails,
}

impl FeasibilityReport {
    /// True when an error of `code` was reported.
    #[must_use]
    pub fn has_error(&self, code: IssueCode) -> bool {
        self.errors.iter().any(|issue| issue.code == code)
    }

    #[must_use]
    pub fn has_warning(&self, code: IssueCode) -> bool {
        self.warnings.iter().any(|issue| issue.code == code)
    }
}
