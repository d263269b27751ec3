//! Candidate initiatives in the selection pool.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dimension::CapacityDimension;
use super::id::{CandidateId, KpiKey};

/// Slice memberships of a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
}

impl DimensionAttributes {
    /// Membership value for a dimension. `All` has no attribute.
    #[must_use]
    pub fn value(&self, dimension: CapacityDimension) -> Option<&str> {
        let value = match dimension {
            CapacityDimension::Country => &self.country,
            CapacityDimension::Product => &self.product,
            CapacityDimension::Department => &self.department,
            CapacityDimension::Category => &self.category,
            CapacityDimension::Program => &self.program,
            CapacityDimension::All => return None,
        };
        value.as_deref().map(str::trim)
    }
}

/// A selectable initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    /// Resource cost in tokens.
    pub token_cost: Decimal,
    #[serde(default)]
    pub dimensions: DimensionAttributes,
    /// Estimated contribution per KPI, in the KPI's native unit.
    #[serde(default)]
    pub kpi_contributions: BTreeMap<KpiKey, Decimal>,
}

impl Candidate {
    pub fn new(id: impl Into<CandidateId>, token_cost: Decimal) -> Self {
        Self {
            id: id.into(),
            token_cost,
            dimensions: DimensionAttributes::default(),
            kpi_contributions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: CapacityDimension, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match dimension {
            CapacityDimension::Country => self.dimensions.country = value,
            CapacityDimension::Product => self.dimensions.product = value,
            CapacityDimension::Department => self.dimensions.department = value,
            CapacityDimension::Category => self.dimensions.category = value,
            CapacityDimension::Program => self.dimensions.program = value,
            CapacityDimension::All => {}
        }
        self
    }

    #[must_use]
    pub fn with_contribution(mut self, kpi: impl Into<KpiKey>, value: Decimal) -> Self {
        self.kpi_contributions.insert(kpi.into(), value);
        self
    }

    /// True when the candidate belongs to the slice. Every candidate belongs
    /// to the global slice.
    #[must_use]
    pub fn matches(&self, dimension: CapacityDimension, key: &str) -> bool {
        if dimension.is_global() {
            return true;
        }
        self.dimensions.value(dimension) == Some(key.trim())
    }

    /// Contribution to a KPI, zero when not estimated.
    #[must_use]
    pub fn contribution(&self, kpi: &KpiKey) -> Decimal {
        self.kpi_contributions
            .get(kpi)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}
