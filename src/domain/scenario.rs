//! Planning scenario: objective mode and run parameters.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::KpiKey;

/// How candidate contributions turn into an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveMode {
    /// Maximize the North Star KPI.
    #[default]
    NorthStar,
    /// Maximize a weighted sum of normalized KPI contributions.
    WeightedKpis,
    /// Satisfy floors, then maximize the primary KPI, then close goal gaps.
    Lexicographic,
}

impl ObjectiveMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NorthStar => "north_star",
            Self::WeightedKpis => "weighted_kpis",
            Self::Lexicographic => "lexicographic",
        }
    }
}

impl fmt::Display for ObjectiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_bonus_weight() -> Decimal {
    Decimal::ONE
}

/// A scenario as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub objective: ObjectiveMode,
    /// Only meaningful for [`ObjectiveMode::WeightedKpis`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weights: BTreeMap<KpiKey, Decimal>,
    /// Primary KPI for lexicographic mode; defaults to the North Star.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_kpi: Option<KpiKey>,
    /// Total token budget, combined with any `all` cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_capacity: Option<Decimal>,
    /// Objective bonus per satisfied synergy pair.
    #[serde(default = "default_bonus_weight")]
    pub synergy_bonus_weight: Decimal,
    /// Fraction of the lexicographic primary optimum that may be given up
    /// to close goal gaps. Zero keeps the optimum intact.
    #[serde(default)]
    pub goal_tradeoff: Decimal,
    /// Per-KPI normalization scale overrides for weighted mode.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub normalization: BTreeMap<KpiKey, Decimal>,
}

impl Scenario {
    /// A north-star scenario with defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            objective: ObjectiveMode::NorthStar,
            weights: BTreeMap::new(),
            primary_kpi: None,
            total_capacity: None,
            synergy_bonus_weight: default_bonus_weight(),
            goal_tradeoff: Decimal::ZERO,
            normalization: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_objective(mut self, objective: ObjectiveMode) -> Self {
        self.objective = objective;
        self
    }

    #[must_use]
    pub fn with_weight(mut self, kpi: impl Into<KpiKey>, weight: Decimal) -> Self {
        self.weights.insert(kpi.into(), weight);
        self
    }

    #[must_use]
    pub fn with_total_capacity(mut self, tokens: Decimal) -> Self {
        self.total_capacity = Some(tokens);
        self
    }

    #[must_use]
    pub fn with_primary_kpi(mut self, kpi: impl Into<KpiKey>) -> Self {
        self.primary_kpi = Some(kpi.into());
        self
    }
}
