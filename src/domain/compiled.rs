//! The compiled, normalized form of one constraint set.
//!
//! Every map and set is a `BTreeMap`/`BTreeSet`, so iteration order and the
//! serialized form depend only on content. Compiling the same rows twice is
//! byte-identical.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dimension::{CapacityDimension, Dimension};
use super::id::{CandidateId, ConstraintSetKey, IdPair, KpiKey};
use super::row::{ConstraintRow, ConstraintType, TargetKind, TargetRow};

/// `dimension -> dimension_key -> tokens`.
pub type CapacityTable = BTreeMap<CapacityDimension, BTreeMap<String, Decimal>>;

/// `dimension -> dimension_key -> kpi_key -> target`.
pub type TargetTable = BTreeMap<CapacityDimension, BTreeMap<String, BTreeMap<KpiKey, TargetSpec>>>;

/// Stored value of a KPI target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An all-or-nothing bundle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bundle {
    pub bundle_key: String,
    pub members: BTreeSet<CandidateId>,
}

/// Compiled constraint set for one `(scenario, constraint_set)` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledConstraintSet {
    pub key: ConstraintSetKey,
    #[serde(default)]
    pub floors: CapacityTable,
    #[serde(default)]
    pub caps: CapacityTable,
    #[serde(default)]
    pub targets: TargetTable,
    #[serde(default)]
    pub mandatory: BTreeSet<CandidateId>,
    /// Sorted; identical bundles collapse, same-named bundles with different
    /// members are both kept.
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    #[serde(default)]
    pub exclusions_initiatives: BTreeSet<CandidateId>,
    #[serde(default)]
    pub exclusions_pairs: BTreeSet<IdPair>,
    #[serde(default)]
    pub prerequisites: BTreeMap<CandidateId, BTreeSet<CandidateId>>,
    #[serde(default)]
    pub synergy_bonuses: BTreeSet<IdPair>,
}

/// A single compiled rule, borrowed from a [`CompiledConstraintSet`].
///
/// The problem builder matches this enum exhaustively, so adding a new
/// constraint kind fails to compile until it is translated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompiledRule<'a> {
    CapacityFloor {
        dimension: CapacityDimension,
        key: &'a str,
        min_tokens: Decimal,
    },
    CapacityCap {
        dimension: CapacityDimension,
        key: &'a str,
        max_tokens: Decimal,
    },
    Mandatory(&'a CandidateId),
    Bundle(&'a Bundle),
    ExcludeInitiative(&'a CandidateId),
    ExcludePair(&'a IdPair),
    RequirePrereq {
        dependent: &'a CandidateId,
        required: &'a BTreeSet<CandidateId>,
    },
    SynergyBonus(&'a IdPair),
}

impl CompiledConstraintSet {
    /// An empty set for `key`.
    #[must_use]
    pub fn new(key: ConstraintSetKey) -> Self {
        Self {
            key,
            floors: BTreeMap::new(),
            caps: BTreeMap::new(),
            targets: BTreeMap::new(),
            mandatory: BTreeSet::new(),
            bundles: Vec::new(),
            exclusions_initiatives: BTreeSet::new(),
            exclusions_pairs: BTreeSet::new(),
            prerequisites: BTreeMap::new(),
            synergy_bonuses: BTreeSet::new(),
        }
    }

    /// Floor for a slice, if any.
    #[must_use]
    pub fn floor(&self, dimension: CapacityDimension, key: &str) -> Option<Decimal> {
        self.floors.get(&dimension)?.get(key).copied()
    }

    /// Cap for a slice, if any.
    #[must_use]
    pub fn cap(&self, dimension: CapacityDimension, key: &str) -> Option<Decimal> {
        self.caps.get(&dimension)?.get(key).copied()
    }

    /// Target for a slice and KPI, if any.
    #[must_use]
    pub fn target(&self, dimension: CapacityDimension, key: &str, kpi: &KpiKey) -> Option<&TargetSpec> {
        self.targets.get(&dimension)?.get(key)?.get(kpi)
    }

    /// Iterate every target as `(dimension, key, kpi, spec)`.
    pub fn iter_targets(
        &self,
    ) -> impl Iterator<Item = (CapacityDimension, &str, &KpiKey, &TargetSpec)> + '_ {
        self.targets.iter().flat_map(|(dimension, slices)| {
            slices.iter().flat_map(move |(key, kpis)| {
                kpis.iter()
                    .map(move |(kpi, spec)| (*dimension, key.as_str(), kpi, spec))
            })
        })
    }

    /// Iterate every constraint rule in canonical order.
    pub fn rules(&self) -> impl Iterator<Item = CompiledRule<'_>> + '_ {
        let floors = self.floors.iter().flat_map(|(dimension, slices)| {
            slices.iter().map(move |(key, min_tokens)| CompiledRule::CapacityFloor {
                dimension: *dimension,
                key: key.as_str(),
                min_tokens: *min_tokens,
            })
        });
        let caps = self.caps.iter().flat_map(|(dimension, slices)| {
            slices.iter().map(move |(key, max_tokens)| CompiledRule::CapacityCap {
                dimension: *dimension,
                key: key.as_str(),
                max_tokens: *max_tokens,
            })
        });
        floors
            .chain(caps)
            .chain(self.mandatory.iter().map(CompiledRule::Mandatory))
            .chain(self.bundles.iter().map(CompiledRule::Bundle))
            .chain(
                self.exclusions_initiatives
                    .iter()
                    .map(CompiledRule::ExcludeInitiative),
            )
            .chain(self.exclusions_pairs.iter().map(CompiledRule::ExcludePair))
            .chain(
                self.prerequisites
                    .iter()
                    .map(|(dependent, required)| CompiledRule::RequirePrereq {
                        dependent,
                        required,
                    }),
            )
            .chain(self.synergy_bonuses.iter().map(CompiledRule::SynergyBonus))
    }

    /// Number of constraint rules (targets excluded).
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules().count()
    }

    /// Reserialize into authoring rows.
    ///
    /// Compiling the returned rows yields a set equal to `self`.
    #[must_use]
    pub fn to_rows(&self) -> (Vec<ConstraintRow>, Vec<TargetRow>) {
        let constraints = self.rules().map(|rule| self.rule_to_row(rule)).collect();
        let targets = self
            .iter_targets()
            .map(|(dimension, key, kpi, spec)| TargetRow {
                row_number: None,
                scenario_name: self.key.scenario_name.clone(),
                constraint_set_name: self.key.constraint_set_name.clone(),
                dimension: dimension.as_str().to_string(),
                dimension_key: key.to_string(),
                kpi_key: kpi.to_string(),
                floor_or_goal: spec.kind.as_str().to_string(),
                target_value: Some(spec.value),
                notes: spec.notes.clone(),
            })
            .collect();
        (constraints, targets)
    }

    fn rule_to_row(&self, rule: CompiledRule<'_>) -> ConstraintRow {
        let mut row = ConstraintRow {
            scenario_name: self.key.scenario_name.clone(),
            constraint_set_name: self.key.constraint_set_name.clone(),
            ..ConstraintRow::default()
        };
        let (constraint_type, dimension, key) = match rule {
            CompiledRule::CapacityFloor {
                dimension,
                key,
                min_tokens,
            } => {
                row.min_tokens = Some(min_tokens);
                (ConstraintType::CapacityFloor, dimension.widen(), key.to_string())
            }
            CompiledRule::CapacityCap {
                dimension,
                key,
                max_tokens,
            } => {
                row.max_tokens = Some(max_tokens);
                (ConstraintType::CapacityCap, dimension.widen(), key.to_string())
            }
            CompiledRule::Mandatory(id) => {
                (ConstraintType::Mandatory, Dimension::Initiative, id.to_string())
            }
            CompiledRule::Bundle(bundle) => {
                row.bundle_member_keys = bundle.members.iter().map(ToString::to_string).collect();
                (
                    ConstraintType::BundleAllOrNothing,
                    Dimension::Bundle,
                    bundle.bundle_key.clone(),
                )
            }
            CompiledRule::ExcludeInitiative(id) => (
                ConstraintType::ExcludeInitiative,
                Dimension::Initiative,
                id.to_string(),
            ),
            CompiledRule::ExcludePair(pair) => {
                row.pair_member_key = Some(pair.second().to_string());
                (
                    ConstraintType::ExcludePair,
                    Dimension::Initiative,
                    pair.first().to_string(),
                )
            }
            CompiledRule::RequirePrereq {
                dependent,
                required,
            } => {
                row.prereq_member_keys = required.iter().map(ToString::to_string).collect();
                (
                    ConstraintType::RequirePrereq,
                    Dimension::Initiative,
                    dependent.to_string(),
                )
            }
            CompiledRule::SynergyBonus(pair) => {
                row.pair_member_key = Some(pair.second().to_string());
                (
                    ConstraintType::SynergyBonus,
                    Dimension::Initiative,
                    pair.first().to_string(),
                )
            }
        };
        row.constraint_type = constraint_type.as_str().to_string();
        row.dimension = dimension.as_str().to_string();
        row.dimension_key = key;
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> CompiledConstraintSet {
        let mut set = CompiledConstraintSet::new(ConstraintSetKey::new("base", "default"));
        set.floors
            .entry(CapacityDimension::Country)
            .or_default()
            .insert("UK".into(), dec!(300));
        set.caps
            .entry(CapacityDimension::All)
            .or_default()
            .insert(String::new(), dec!(500));
        set.mandatory.insert("A".into());
        set.exclusions_pairs
            .insert(IdPair::new("B".into(), "C".into()).unwrap());
        set
    }

    #[test]
    fn rules_follow_canonical_order() {
        let set = sample();
        let kinds: Vec<_> = set
            .rules()
            .map(|rule| match rule {
                CompiledRule::CapacityFloor { .. } => "floor",
                CompiledRule::CapacityCap { .. } => "cap",
                CompiledRule::Mandatory(_) => "mandatory",
                CompiledRule::ExcludePair(_) => "pair",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["floor", "cap", "mandatory", "pair"]);
    }

    #[test]
    fn to_rows_emits_one_row_per_rule() {
        let set = sample();
        let (rows, targets) = set.to_rows();
        assert_eq!(rows.len(), set.rule_count());
        assert!(targets.is_empty());
        let pair_row = rows
            .iter()
            .find(|row| row.constraint_type == "exclude_pair")
            .unwrap();
        assert_eq!(pair_row.dimension_key, "B");
        assert_eq!(pair_row.pair_member_key.as_deref(), Some("C"));
    }

    #[test]
    fn lookups_return_stored_values() {
        let set = sample();
        assert_eq!(set.floor(CapacityDimension::Country, "UK"), Some(dec!(300)));
        assert_eq!(set.cap(CapacityDimension::All, ""), Some(dec!(500)));
        assert_eq!(set.cap(CapacityDimension::Country, "UK"), None);
    }
}
