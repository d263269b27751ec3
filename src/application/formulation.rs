//! Translation of a compiled constraint set into a MILP with objective stages.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::candidate::Candidate;
use crate::domain::compiled::{CompiledConstraintSet, CompiledRule};
use crate::domain::dimension::CapacityDimension;
use crate::domain::id::{CandidateId, KpiKey};
use crate::domain::model::{LinearConstraint, MilpModel, Objective, VarIndex};
use crate::domain::problem::{ProblemWarning, SynergyVar};
use crate::domain::row::TargetKind;
use crate::domain::scenario::Scenario;

/// Resolved objective inputs, validated by the builder.
pub(crate) enum ObjectivePlan<'a> {
    NorthStar {
        kpi: &'a KpiKey,
    },
    Weighted {
        weights: &'a BTreeMap<KpiKey, Decimal>,
        scales: &'a BTreeMap<KpiKey, Decimal>,
    },
    Lexicographic {
        primary: &'a KpiKey,
    },
}

pub(crate) struct Formulation {
    pub model: MilpModel,
    pub stages: Vec<Objective>,
    pub primary_stage: usize,
    pub synergy_vars: Vec<SynergyVar>,
    pub warnings: Vec<ProblemWarning>,
}

/// Build the model for sorted, deduplicated `candidates`.
pub(crate) fn formulate(
    scenario: &Scenario,
    set: &CompiledConstraintSet,
    candidates: &[Candidate],
    global_capacity: Option<Decimal>,
    plan: &ObjectivePlan<'_>,
) -> Formulation {
    let mut f = Formulator {
        set,
        candidates,
        model: MilpModel::new(),
        synergy_vars: Vec::new(),
        warnings: Vec::new(),
    };
    for candidate in candidates {
        f.model.add_binary(format!("x[{}]", candidate.id));
    }

    if let Some(capacity) = global_capacity {
        let terms = f.cost_terms(CapacityDimension::All, "");
        f.model
            .add_constraint(LinearConstraint::leq("global_capacity", terms, capacity));
    }
    for rule in set.rules() {
        f.translate(rule, scenario.synergy_bonus_weight);
    }
    f.floor_targets();

    let synergy: Vec<(VarIndex, Decimal)> = f
        .synergy_vars
        .iter()
        .map(|s| (s.var, scenario.synergy_bonus_weight))
        .collect();

    let mut stages = Vec::new();
    let primary_stage = match plan {
        ObjectivePlan::NorthStar { kpi } => {
            let mut terms = f.kpi_terms(kpi, Decimal::ONE);
            terms.extend(synergy);
            stages.push(Objective::maximize(format!("north_star[{kpi}]"), terms));
            0
        }
        ObjectivePlan::Weighted { weights, scales } => {
            let mut per_candidate = vec![Decimal::ZERO; candidates.len()];
            for (kpi, weight) in weights.iter() {
                let Some(scale) = scales.get(kpi) else {
                    continue;
                };
                for (i, coef) in f.kpi_terms(kpi, *scale) {
                    per_candidate[i] += *weight * coef;
                }
            }
            let mut terms: Vec<(VarIndex, Decimal)> = per_candidate
                .into_iter()
                .enumerate()
                .filter(|(_, c)| !c.is_zero())
                .collect();
            terms.extend(synergy);
            stages.push(Objective::maximize("weighted_kpis", terms));
            0
        }
        ObjectivePlan::Lexicographic { primary } => {
            stages.push(Objective::minimize("feasibility", Vec::new()));
            let mut terms = f.kpi_terms(primary, Decimal::ONE);
            terms.extend(synergy);
            stages.push(
                Objective::maximize(format!("primary[{primary}]"), terms)
                    .with_slack(scenario.goal_tradeoff),
            );
            let goal_terms = f.goal_attainment();
            if !goal_terms.is_empty() {
                stages.push(Objective::maximize("goal_attainment", goal_terms));
            }
            1
        }
    };

    let selected: Vec<(VarIndex, Decimal)> =
        (0..candidates.len()).map(|i| (i, Decimal::ONE)).collect();
    stages.push(Objective::minimize("fewest_selected", selected));
    stages.push(Objective::minimize(
        "fewest_tokens",
        f.cost_terms(CapacityDimension::All, ""),
    ));

    Formulation {
        model: f.model,
        stages,
        primary_stage,
        synergy_vars: f.synergy_vars,
        warnings: f.warnings,
    }
}

struct Formulator<'a> {
    set: &'a CompiledConstraintSet,
    candidates: &'a [Candidate],
    model: MilpModel,
    synergy_vars: Vec<SynergyVar>,
    warnings: Vec<ProblemWarning>,
}

impl Formulator<'_> {
    fn var(&mut self, rule: &str, id: &CandidateId) -> Option<VarIndex> {
        let found = self.candidates.binary_search_by(|c| c.id.cmp(id)).ok();
        if found.is_none() {
            self.warnings.push(ProblemWarning::UnknownCandidate {
                rule: rule.to_string(),
                id: id.clone(),
            });
        }
        found
    }

    fn cost_terms(&self, dimension: CapacityDimension, key: &str) -> Vec<(VarIndex, Decimal)> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.matches(dimension, key) && !c.token_cost.is_zero())
            .map(|(i, c)| (i, c.token_cost))
            .collect()
    }

    fn slice_kpi_terms(
        &self,
        dimension: CapacityDimension,
        key: &str,
        kpi: &KpiKey,
    ) -> Vec<(VarIndex, Decimal)> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.matches(dimension, key))
            .map(|(i, c)| (i, c.contribution(kpi)))
            .filter(|(_, v)| !v.is_zero())
            .collect()
    }

    fn kpi_terms(&self, kpi: &KpiKey, scale: Decimal) -> Vec<(VarIndex, Decimal)> {
        self.slice_kpi_terms(CapacityDimension::All, "", kpi)
            .into_iter()
            .map(|(i, v)| (i, v / scale))
            .collect()
    }

    fn translate(&mut self, rule: CompiledRule<'_>, bonus: Decimal) {
        match rule {
            CompiledRule::CapacityFloor {
                dimension,
                key,
                min_tokens,
            } => {
                let terms = self.cost_terms(dimension, key);
                self.model.add_constraint(LinearConstraint::geq(
                    format!("capacity_floor[{}]", dimension.slice_label(key)),
                    terms,
                    min_tokens,
                ));
            }
            CompiledRule::CapacityCap {
                dimension,
                key,
                max_tokens,
            } => {
                // The `all` cap is folded into the global capacity row.
                if dimension.is_global() {
                    return;
                }
                let terms = self.cost_terms(dimension, key);
                self.model.add_constraint(LinearConstraint::leq(
                    format!("capacity_cap[{}]", dimension.slice_label(key)),
                    terms,
                    max_tokens,
                ));
            }
            CompiledRule::Mandatory(id) => {
                let label = format!("mandatory[{id}]");
                if let Some(x) = self.var(&label, id) {
                    self.model
                        .add_constraint(LinearConstraint::eq(label, vec![(x, Decimal::ONE)], Decimal::ONE));
                }
            }
            CompiledRule::ExcludeInitiative(id) => {
                let label = format!("exclude_initiative[{id}]");
                if let Some(x) = self.var(&label, id) {
                    self.model
                        .add_constraint(LinearConstraint::eq(label, vec![(x, Decimal::ONE)], Decimal::ZERO));
                }
            }
            CompiledRule::Bundle(bundle) => {
                let label = format!("bundle_all_or_nothing[{}]", bundle.bundle_key);
                let found: Vec<Option<VarIndex>> =
                    bundle.members.iter().map(|id| self.var(&label, id)).collect();
                let vars: Vec<VarIndex> = found.iter().flatten().copied().collect();
                if vars.len() < found.len() {
                    // A member outside the pool is never selected, so neither is the rest.
                    for &x in &vars {
                        self.model.add_constraint(LinearConstraint::eq(
                            label.clone(),
                            vec![(x, Decimal::ONE)],
                            Decimal::ZERO,
                        ));
                    }
                } else if let Some((&first, rest)) = vars.split_first() {
                    for &other in rest {
                        self.model.add_constraint(LinearConstraint::eq(
                            label.clone(),
                            vec![(other, Decimal::ONE), (first, -Decimal::ONE)],
                            Decimal::ZERO,
                        ));
                    }
                }
            }
            CompiledRule::ExcludePair(pair) => {
                let label = format!("exclude_pair[{pair}]");
                let a = self.var(&label, pair.first());
                let b = self.var(&label, pair.second());
                if let (Some(a), Some(b)) = (a, b) {
                    self.model.add_constraint(LinearConstraint::leq(
                        label,
                        vec![(a, Decimal::ONE), (b, Decimal::ONE)],
                        Decimal::ONE,
                    ));
                }
            }
            CompiledRule::RequirePrereq {
                dependent,
                required,
            } => {
                let label = format!("require_prereq[{dependent}]");
                let Some(dep) = self.var(&label, dependent) else {
                    return;
                };
                for id in required {
                    if let Some(req) = self.var(&label, id) {
                        self.model.add_constraint(LinearConstraint::leq(
                            label.clone(),
                            vec![(dep, Decimal::ONE), (req, -Decimal::ONE)],
                            Decimal::ZERO,
                        ));
                    }
                }
            }
            CompiledRule::SynergyBonus(pair) => {
                if bonus.is_zero() {
                    return;
                }
                let label = format!("synergy_bonus[{pair}]");
                let a = self.var(&label, pair.first());
                let b = self.var(&label, pair.second());
                let (Some(a), Some(b)) = (a, b) else {
                    return;
                };
                // y <= x_a and y <= x_b; y only pays when both are selected.
                let y = self.model.add_binary(format!("y[{pair}]"));
                for x in [a, b] {
                    self.model.add_constraint(LinearConstraint::leq(
                        label.clone(),
                        vec![(y, Decimal::ONE), (x, -Decimal::ONE)],
                        Decimal::ZERO,
                    ));
                }
                self.synergy_vars.push(SynergyVar {
                    pair: pair.clone(),
                    var: y,
                });
            }
        }
    }

    /// Floor targets are hard; goals never are.
    fn floor_targets(&mut self) {
        let set = self.set;
        for (dimension, key, kpi, spec) in set.iter_targets() {
            if spec.kind != TargetKind::Floor {
                continue;
            }
            let terms = self.slice_kpi_terms(dimension, key, kpi);
            self.model.add_constraint(LinearConstraint::geq(
                format!("target_floor[{}:{kpi}]", dimension.slice_label(key)),
                terms,
                spec.value,
            ));
        }
    }

    /// Add one progress variable per positive goal and return the
    /// attainment objective `sum(g_t / target_t)`.
    fn goal_attainment(&mut self) -> Vec<(VarIndex, Decimal)> {
        let set = self.set;
        let mut terms = Vec::new();
        for (dimension, key, kpi, spec) in set.iter_targets() {
            if spec.kind != TargetKind::Goal || spec.value <= Decimal::ZERO {
                continue;
            }
            let name = format!("{}:{kpi}", dimension.slice_label(key));
            let g = self
                .model
                .add_continuous(format!("g[{name}]"), Decimal::ZERO, spec.value);
            let mut progress = vec![(g, Decimal::ONE)];
            progress.extend(
                self.slice_kpi_terms(dimension, key, kpi)
                    .into_iter()
                    .map(|(i, v)| (i, -v)),
            );
            self.model.add_constraint(LinearConstraint::leq(
                format!("goal_progress[{name}]"),
                progress,
                Decimal::ZERO,
            ));
            terms.push((g, Decimal::ONE / spec.value));
        }
        terms
    }
}
