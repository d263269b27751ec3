//! Row shapes as delivered by the authoring surface.
//!
//! Rows arrive already parsed (header aliases resolved, member lists split).
//! Field values are still untrusted strings at this point; the validator
//! turns them into typed rules.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dimension::normalize_literal;

/// One row of the constraints table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRow {
    /// Source row number, when the authoring surface supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
    pub scenario_name: String,
    pub constraint_set_name: String,
    pub constraint_type: String,
    pub dimension: String,
    #[serde(default)]
    pub dimension_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_tokens: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bundle_member_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prereq_member_keys: Vec<String>,
    /// Second candidate of `exclude_pair` and `synergy_bonus` rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_member_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One row of the targets table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
    pub scenario_name: String,
    pub constraint_set_name: String,
    pub dimension: String,
    #[serde(default)]
    pub dimension_key: String,
    pub kpi_key: String,
    pub floor_or_goal: String,
    /// Missing values are reported by the validator, not by the parser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Identity of an input row, attached to every validation message.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowIdentity {
    pub row_number: usize,
    pub scenario_name: String,
    pub constraint_set_name: String,
    pub dimension: String,
    pub dimension_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_key: Option<String>,
}

impl RowIdentity {
    /// Identity of a constraint row.
    #[must_use]
    pub fn of_constraint(row: &ConstraintRow, row_number: usize) -> Self {
        Self {
            row_number,
            scenario_name: row.scenario_name.trim().to_string(),
            constraint_set_name: row.constraint_set_name.trim().to_string(),
            dimension: row.dimension.trim().to_string(),
            dimension_key: row.dimension_key.trim().to_string(),
            kpi_key: None,
        }
    }

    /// Identity of a target row.
    #[must_use]
    pub fn of_target(row: &TargetRow, row_number: usize) -> Self {
        Self {
            row_number,
            scenario_name: row.scenario_name.trim().to_string(),
            constraint_set_name: row.constraint_set_name.trim().to_string(),
            dimension: row.dimension.trim().to_string(),
            dimension_key: row.dimension_key.trim().to_string(),
            kpi_key: Some(row.kpi_key.trim().to_string()),
        }
    }
}

impl fmt::Display for RowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} ({}/{}, {}={}",
            self.row_number,
            self.scenario_name,
            self.constraint_set_name,
            self.dimension,
            self.dimension_key
        )?;
        if let Some(kpi) = &self.kpi_key {
            write!(f, ", kpi={kpi}")?;
        }
        f.write_str(")")
    }
}

/// Discriminant of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    CapacityFloor,
    CapacityCap,
    Mandatory,
    BundleAllOrNothing,
    ExcludeInitiative,
    ExcludePair,
    RequirePrereq,
    SynergyBonus,
}

impl ConstraintType {
    /// Row literal for this constraint type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CapacityFloor => "capacity_floor",
            Self::CapacityCap => "capacity_cap",
            Self::Mandatory => "mandatory",
            Self::BundleAllOrNothing => "bundle_all_or_nothing",
            Self::ExcludeInitiative => "exclude_initiative",
            Self::ExcludePair => "exclude_pair",
            Self::RequirePrereq => "require_prereq",
            Self::SynergyBonus => "synergy_bonus",
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized `constraint_type` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownConstraintType(pub String);

impl FromStr for ConstraintType {
    type Err = UnknownConstraintType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match normalize_literal(s).as_str() {
            "capacity_floor" => Self::CapacityFloor,
            "capacity_cap" => Self::CapacityCap,
            "mandatory" => Self::Mandatory,
            "bundle_all_or_nothing" => Self::BundleAllOrNothing,
            "exclude_initiative" => Self::ExcludeInitiative,
            "exclude_pair" => Self::ExcludePair,
            "require_prereq" => Self::RequirePrereq,
            "synergy_bonus" => Self::SynergyBonus,
            _ => return Err(UnknownConstraintType(s.to_string())),
        };
        Ok(parsed)
    }
}

/// Whether a KPI target is a hard minimum or a soft preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Soft, preferred value; only tracked for gap reporting.
    Goal,
    /// Hard minimum; enforced as a solver constraint.
    Floor,
}

impl TargetKind {
    /// Row literal for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Floor => "floor",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "floor" => Ok(Self::Floor),
            "goal" => Ok(Self::Goal),
            _ => Err(s.to_string()),
        }
    }
}
