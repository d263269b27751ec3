//! KPI catalog: which KPIs exist, which one is the North Star, and which
//! metrics feed causally into others.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::KpiKey;

/// Tier of a KPI in the objective hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiLevel {
    NorthStar,
    Strategic,
}

/// One KPI as declared by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub key: KpiKey,
    /// `None` for supporting metrics that may carry targets but never
    /// enter an objective.
    #[serde(default)]
    pub level: Option<KpiLevel>,
    /// KPIs this metric drives (e.g. conversion rate feeds revenue).
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub feeds_into: BTreeSet<KpiKey>,
}

impl KpiDefinition {
    pub fn new(key: impl Into<KpiKey>, level: Option<KpiLevel>) -> Self {
        Self {
            key: key.into(),
            level,
            feeds_into: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn feeding(mut self, target: impl Into<KpiKey>) -> Self {
        self.feeds_into.insert(target.into());
        self
    }
}

/// Validated KPI catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KpiCatalog {
    kpis: BTreeMap<KpiKey, KpiDefinition>,
    north_star: Option<KpiKey>,
}

impl KpiCatalog {
    /// Build a catalog, rejecting duplicate keys, a second North Star, and
    /// causal edges to undeclared KPIs.
    pub fn new(definitions: impl IntoIterator<Item = KpiDefinition>) -> Result<Self, DomainError> {
        let mut kpis = BTreeMap::new();
        let mut north_star: Option<KpiKey> = None;

        for def in definitions {
            if def.level == Some(KpiLevel::NorthStar) {
                if let Some(first) = &north_star {
                    return Err(DomainError::MultipleNorthStars {
                        first: first.to_string(),
                        second: def.key.to_string(),
                    });
                }
                north_star = Some(def.key.clone());
            }
            if kpis.contains_key(&def.key) {
                return Err(DomainError::DuplicateKpi {
                    key: def.key.to_string(),
                });
            }
            kpis.insert(def.key.clone(), def);
        }

        for def in kpis.values() {
            if let Some(target) = def.feeds_into.iter().find(|t| !kpis.contains_key(*t)) {
                return Err(DomainError::UnknownCausalTarget {
                    key: def.key.to_string(),
                    target: target.to_string(),
                });
            }
        }

        Ok(Self { kpis, north_star })
    }

    #[must_use]
    pub fn get(&self, key: &KpiKey) -> Option<&KpiDefinition> {
        self.kpis.get(key)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &KpiDefinition> {
        self.kpis.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kpis.is_empty()
    }

    pub(crate) fn keys(&self) -> BTreeSet<KpiKey> {
        self.kpis.keys().cloned().collect()
    }

    pub(crate) fn level(&self, key: &KpiKey) -> Option<KpiLevel> {
        self.kpis.get(key).and_then(|def| def.level)
    }

    pub(crate) fn north_star_key(&self) -> Option<&KpiKey> {
        self.north_star.as_ref()
    }

    /// True when `input` reaches `output` through one or more `feeds_into`
    /// edges.
    pub(crate) fn reaches(&self, input: &KpiKey, output: &KpiKey) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![input];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(def) = self.kpis.get(current) else {
                continue;
            };
            for next in &def.feeds_into {
                if next == output {
                    return true;
                }
                stack.push(next);
            }
        }
        false
    }
}
