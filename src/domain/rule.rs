//! Typed rules produced by row validation.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dimension::CapacityDimension;
use super::id::{CandidateId, ConstraintSetKey, IdPair, KpiKey};
use super::row::{ConstraintType, RowIdentity, TargetKind};

/// One validated constraint rule, one variant per `constraint_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "constraint_type", rename_all = "snake_case")]
pub enum ConstraintRule {
    CapacityFloor {
        dimension: CapacityDimension,
        key: String,
        min_tokens: Decimal,
    },
    CapacityCap {
        dimension: CapacityDimension,
        key: String,
        max_tokens: Decimal,
    },
    Mandatory {
        id: CandidateId,
    },
    #[serde(rename = "bundle_all_or_nothing")]
    Bundle {
        bundle_key: String,
        members: BTreeSet<CandidateId>,
    },
    ExcludeInitiative {
        id: CandidateId,
    },
    ExcludePair {
        pair: IdPair,
    },
    RequirePrereq {
        dependent: CandidateId,
        required: BTreeSet<CandidateId>,
    },
    SynergyBonus {
        pair: IdPair,
    },
}

impl ConstraintRule {
    /// The row discriminant this rule was built from.
    #[must_use]
    pub const fn constraint_type(&self) -> ConstraintType {
        match self {
            Self::CapacityFloor { .. } => ConstraintType::CapacityFloor,
            Self::CapacityCap { .. } => ConstraintType::CapacityCap,
            Self::Mandatory { .. } => ConstraintType::Mandatory,
            Self::Bundle { .. } => ConstraintType::BundleAllOrNothing,
            Self::ExcludeInitiative { .. } => ConstraintType::ExcludeInitiative,
            Self::ExcludePair { .. } => ConstraintType::ExcludePair,
            Self::RequirePrereq { .. } => ConstraintType::RequirePrereq,
            Self::SynergyBonus { .. } => ConstraintType::SynergyBonus,
        }
    }
}

/// A validated KPI target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRule {
    pub dimension: CapacityDimension,
    /// Slice value; empty for the global scope.
    pub key: String,
    pub kpi_key: KpiKey,
    pub kind: TargetKind,
    pub value: Decimal,
    pub notes: Option<String>,
}

/// A validated rule together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub set_key: ConstraintSetKey,
    pub identity: RowIdentity,
    pub rule: T,
}
