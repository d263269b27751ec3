//! Pure compilation of validated rows into constraint sets.
//!
//! `compile` is a deterministic function of its inputs: no I/O, no clocks,
//! and no dependence on row order beyond the row numbers carried into
//! messages. Running it twice over the same rows yields identical output.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::validate::{validate_constraint_row, validate_target_row};
use crate::domain::compiled::{Bundle, CompiledConstraintSet, TargetSpec};
use crate::domain::dimension::CapacityDimension;
use crate::domain::id::{ConstraintSetKey, KpiKey};
use crate::domain::row::{ConstraintRow, RowIdentity, TargetKind, TargetRow};
use crate::domain::rule::{ConstraintRule, Sourced, TargetRule};
use crate::domain::validation::{ValidationCode, ValidationMessage};

/// Output of [`compile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    pub sets: BTreeMap<ConstraintSetKey, CompiledConstraintSet>,
    /// Errors and warnings, ordered by row number.
    pub messages: Vec<ValidationMessage>,
}

impl Compilation {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter().filter(|m| m.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter().filter(|m| !m.is_error())
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    #[must_use]
    pub fn get(&self, key: &ConstraintSetKey) -> Option<&CompiledConstraintSet> {
        self.sets.get(key)
    }
}

/// Validate, group and normalize constraint and target rows.
///
/// Rows with hard errors are dropped and reported; every other row lands in
/// the set keyed by its `(scenario_name, constraint_set_name)`. Row numbers
/// default to the 1-based position within each slice.
pub fn compile(
    constraint_rows: &[ConstraintRow],
    target_rows: &[TargetRow],
    valid_kpi_keys: &BTreeSet<KpiKey>,
) -> Compilation {
    let mut messages = Vec::new();
    let mut buckets: BTreeMap<ConstraintSetKey, Bucket> = BTreeMap::new();

    for (index, row) in constraint_rows.iter().enumerate() {
        match validate_constraint_row(row, index + 1) {
            Ok(validated) => {
                messages.extend(validated.warnings);
                let set_key = ConstraintSetKey::new(&row.scenario_name, &row.constraint_set_name);
                let identity = RowIdentity::of_constraint(row, row.row_number.unwrap_or(index + 1));
                buckets.entry(set_key.clone()).or_default().rules.push(Sourced {
                    set_key,
                    identity,
                    rule: validated.rule,
                });
            }
            Err(message) => messages.push(message),
        }
    }

    for (index, row) in target_rows.iter().enumerate() {
        match validate_target_row(row, index + 1, valid_kpi_keys) {
            Ok(validated) => {
                messages.extend(validated.warnings);
                let set_key = ConstraintSetKey::new(&row.scenario_name, &row.constraint_set_name);
                let identity = RowIdentity::of_target(row, row.row_number.unwrap_or(index + 1));
                buckets.entry(set_key.clone()).or_default().targets.push(Sourced {
                    set_key,
                    identity,
                    rule: validated.rule,
                });
            }
            Err(message) => messages.push(message),
        }
    }

    let mut sets = BTreeMap::new();
    for (key, bucket) in buckets {
        debug!(
            set = %key,
            rules = bucket.rules.len(),
            targets = bucket.targets.len(),
            "compiling constraint set"
        );
        let set = bucket.build(key.clone(), &mut messages);
        sets.insert(key, set);
    }

    messages.sort_by(|a, b| {
        (a.identity.row_number, a.identity.kpi_key.is_some(), &a.code, &a.message).cmp(&(
            b.identity.row_number,
            b.identity.kpi_key.is_some(),
            &b.code,
            &b.message,
        ))
    });

    let compilation = Compilation { sets, messages };
    info!(
        sets = compilation.sets.len(),
        constraint_rows = constraint_rows.len(),
        target_rows = target_rows.len(),
        errors = compilation.errors().count(),
        warnings = compilation.warnings().count(),
        "compilation complete"
    );
    compilation
}

#[derive(Default)]
struct Bucket {
    rules: Vec<Sourced<ConstraintRule>>,
    targets: Vec<Sourced<TargetRule>>,
}

/// A winning value and the row it came from, kept for duplicate warnings.
struct Seen<T> {
    value: T,
    identity: RowIdentity,
}

impl Bucket {
    fn build(
        self,
        key: ConstraintSetKey,
        messages: &mut Vec<ValidationMessage>,
    ) -> CompiledConstraintSet {
        let mut set = CompiledConstraintSet::new(key);
        let mut floors: BTreeMap<(CapacityDimension, String), Seen<Decimal>> = BTreeMap::new();
        let mut caps: BTreeMap<(CapacityDimension, String), Seen<Decimal>> = BTreeMap::new();
        let mut bundles = BTreeSet::new();

        for Sourced { identity, rule, .. } in self.rules {
            match rule {
                ConstraintRule::CapacityFloor {
                    dimension,
                    key,
                    min_tokens,
                } => {
                    let slot = (dimension, key);
                    merge_capacity(&mut floors, slot, min_tokens, identity, Strictest::Max, messages);
                }
                ConstraintRule::CapacityCap {
                    dimension,
                    key,
                    max_tokens,
                } => {
                    let slot = (dimension, key);
                    merge_capacity(&mut caps, slot, max_tokens, identity, Strictest::Min, messages);
                }
                ConstraintRule::Mandatory { id } => {
                    set.mandatory.insert(id);
                }
                ConstraintRule::Bundle {
                    bundle_key,
                    members,
                } => {
                    bundles.insert(Bundle {
                        bundle_key,
                        members,
                    });
                }
                ConstraintRule::ExcludeInitiative { id } => {
                    set.exclusions_initiatives.insert(id);
                }
                ConstraintRule::ExcludePair { pair } => {
                    set.exclusions_pairs.insert(pair);
                }
                ConstraintRule::RequirePrereq {
                    dependent,
                    required,
                } => {
                    set.prerequisites.entry(dependent).or_default().extend(required);
                }
                ConstraintRule::SynergyBonus { pair } => {
                    set.synergy_bonuses.insert(pair);
                }
            }
        }

        for ((dimension, key), seen) in floors {
            set.floors.entry(dimension).or_default().insert(key, seen.value);
        }
        for ((dimension, key), seen) in caps {
            set.caps.entry(dimension).or_default().insert(key, seen.value);
        }
        set.bundles = bundles.into_iter().collect();

        let mut targets: BTreeMap<(CapacityDimension, String, KpiKey), Seen<TargetSpec>> =
            BTreeMap::new();
        for Sourced { identity, rule, .. } in self.targets {
            let spec = TargetSpec {
                kind: rule.kind,
                value: rule.value,
                notes: rule.notes,
            };
            let slot = (rule.dimension, rule.key, rule.kpi_key);
            match targets.get_mut(&slot) {
                None => {
                    targets.insert(slot, Seen { value: spec, identity });
                }
                Some(seen) => {
                    if (seen.value.kind, seen.value.value) != (spec.kind, spec.value) {
                        messages.push(ValidationMessage::warning(
                            identity.clone(),
                            ValidationCode::ConflictingDuplicate,
                            format!(
                                "target on {} conflicts with row {} ({} {} vs {} {}); the stronger target is kept",
                                slot.2,
                                seen.identity.row_number,
                                seen.value.kind,
                                seen.value.value,
                                spec.kind,
                                spec.value
                            ),
                        ));
                    }
                    if target_rank(&spec) > target_rank(&seen.value) {
                        *seen = Seen { value: spec, identity };
                    }
                }
            }
        }
        for ((dimension, key, kpi), seen) in targets {
            set.targets
                .entry(dimension)
                .or_default()
                .entry(key)
                .or_default()
                .insert(kpi, seen.value);
        }

        set
    }
}

/// Floor beats goal, then the larger value, then the notes.
fn target_rank(spec: &TargetSpec) -> (TargetKind, Decimal, Option<&str>) {
    (spec.kind, spec.value, spec.notes.as_deref())
}

/// Which duplicate capacity value is the more restrictive one.
#[derive(Clone, Copy)]
enum Strictest {
    /// Floors: the larger minimum.
    Max,
    /// Caps: the smaller maximum.
    Min,
}

impl Strictest {
    fn pick(self, a: Decimal, b: Decimal) -> Decimal {
        match self {
            Self::Max => a.max(b),
            Self::Min => a.min(b),
        }
    }

    const fn rule(self) -> &'static str {
        match self {
            Self::Max => "capacity_floor",
            Self::Min => "capacity_cap",
        }
    }
}

fn merge_capacity(
    table: &mut BTreeMap<(CapacityDimension, String), Seen<Decimal>>,
    slot: (CapacityDimension, String),
    value: Decimal,
    identity: RowIdentity,
    strictest: Strictest,
    messages: &mut Vec<ValidationMessage>,
) {
    match table.get_mut(&slot) {
        None => {
            table.insert(slot, Seen { value, identity });
        }
        Some(seen) => {
            if seen.value != value {
                let kept = strictest.pick(seen.value, value);
                messages.push(ValidationMessage::warning(
                    identity.clone(),
                    ValidationCode::ConflictingDuplicate,
                    format!(
                        "duplicate {} conflicts with row {} ({} vs {}); keeping {kept}",
                        strictest.rule(),
                        seen.identity.row_number,
                        seen.value,
                        value
                    ),
                ));
                if kept == value {
                    *seen = Seen { value, identity };
                }
            }
        }
    }
}
