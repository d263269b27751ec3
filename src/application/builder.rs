//! Problem builder: scenario + compiled set + candidate pool -> problem.
//!
//! Configuration mistakes (a weight on an unknown KPI, a missing North Star)
//! fail fast with [`ProblemError`]. Softer findings are kept as
//! [`ProblemWarning`]s on the problem and surface in the feasibility report.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::formulation::{formulate, ObjectivePlan};
use crate::domain::candidate::Candidate;
use crate::domain::compiled::CompiledConstraintSet;
use crate::domain::dimension::CapacityDimension;
use crate::domain::id::KpiKey;
use crate::domain::problem::{OptimizationProblem, ProblemWarning};
use crate::domain::scenario::{ObjectiveMode, Scenario};
use crate::error::ProblemError;
use crate::port::KpiRegistry;

/// Build an engine-ready problem.
///
/// # Errors
///
/// Returns a [`ProblemError`] when the scenario, pool or KPI setup cannot
/// produce a well-defined objective.
pub fn build(
    scenario: &Scenario,
    compiled: &CompiledConstraintSet,
    candidates: &[Candidate],
    registry: &dyn KpiRegistry,
) -> Result<OptimizationProblem, ProblemError> {
    if scenario.name.trim() != compiled.key.scenario_name {
        return Err(ProblemError::ScenarioMismatch {
            scenario: scenario.name.clone(),
            constraint_set: compiled.key.scenario_name.clone(),
        });
    }
    if scenario.goal_tradeoff < Decimal::ZERO || scenario.goal_tradeoff > Decimal::ONE {
        return Err(ProblemError::OutOfRange {
            field: "goal_tradeoff",
            value: scenario.goal_tradeoff,
        });
    }

    let pool = sorted_pool(candidates)?;
    let objective_kpis = registry.objective_kpis();
    let north_star = registry.north_star();
    let mut warnings = Vec::new();

    if !scenario.weights.is_empty() && scenario.objective != ObjectiveMode::WeightedKpis {
        return Err(ProblemError::WeightsNotAllowed {
            mode: scenario.objective.to_string(),
        });
    }

    let mut scales = BTreeMap::new();
    let primary_kpi = match scenario.objective {
        ObjectiveMode::NorthStar => Some(north_star.clone().ok_or_else(|| {
            ProblemError::NoNorthStar {
                mode: scenario.objective.to_string(),
            }
        })?),
        ObjectiveMode::WeightedKpis => {
            check_weights(scenario, &objective_kpis, registry, &mut warnings)?;
            scales = resolve_scales(scenario, compiled)?;
            None
        }
        ObjectiveMode::Lexicographic => {
            let primary = scenario
                .primary_kpi
                .clone()
                .or_else(|| north_star.clone())
                .ok_or_else(|| ProblemError::NoNorthStar {
                    mode: scenario.objective.to_string(),
                })?;
            if !objective_kpis.contains(&primary) {
                return Err(ProblemError::InvalidPrimaryKpi { kpi: primary });
            }
            Some(primary)
        }
    };

    for candidate in &pool {
        for kpi in candidate.kpi_contributions.keys() {
            if !objective_kpis.contains(kpi) {
                warnings.push(ProblemWarning::IgnoredContribution {
                    candidate: candidate.id.clone(),
                    kpi: kpi.clone(),
                });
            }
        }
    }

    let global_capacity = match (
        scenario.total_capacity,
        compiled.cap(CapacityDimension::All, ""),
    ) {
        (Some(total), Some(cap)) => Some(total.min(cap)),
        (total, cap) => total.or(cap),
    };

    let plan = match (&scenario.objective, &primary_kpi) {
        (ObjectiveMode::NorthStar, Some(kpi)) => ObjectivePlan::NorthStar { kpi },
        (ObjectiveMode::Lexicographic, Some(primary)) => ObjectivePlan::Lexicographic { primary },
        _ => ObjectivePlan::Weighted {
            weights: &scenario.weights,
            scales: &scales,
        },
    };
    let formulation = formulate(scenario, compiled, &pool, global_capacity, &plan);
    warnings.extend(formulation.warnings);

    for warning in &warnings {
        warn!(scenario = %scenario.name, %warning, "problem warning");
    }
    debug!(
        scenario = %scenario.name,
        set = %compiled.key,
        candidates = pool.len(),
        variables = formulation.model.num_variables(),
        constraints = formulation.model.constraints.len(),
        stages = formulation.stages.len(),
        "problem built"
    );

    Ok(OptimizationProblem {
        scenario: scenario.clone(),
        compiled: compiled.clone(),
        candidates: pool,
        north_star,
        primary_kpi,
        global_capacity,
        normalization: scales,
        model: formulation.model,
        stages: formulation.stages,
        primary_stage: formulation.primary_stage,
        synergy_vars: formulation.synergy_vars,
        warnings,
    })
}

fn sorted_pool(candidates: &[Candidate]) -> Result<Vec<Candidate>, ProblemError> {
    let mut pool = candidates.to_vec();
    pool.sort_by(|a, b| a.id.cmp(&b.id));
    if let Some(dup) = pool.windows(2).find(|w| w[0].id == w[1].id) {
        return Err(ProblemError::DuplicateCandidate {
            id: dup[0].id.clone(),
        });
    }
    if let Some(negative) = pool.iter().find(|c| c.token_cost < Decimal::ZERO) {
        return Err(ProblemError::NegativeTokenCost {
            id: negative.id.clone(),
            cost: negative.token_cost,
        });
    }
    Ok(pool)
}

fn check_weights(
    scenario: &Scenario,
    objective_kpis: &BTreeSet<KpiKey>,
    registry: &dyn KpiRegistry,
    warnings: &mut Vec<ProblemWarning>,
) -> Result<(), ProblemError> {
    if scenario.weights.is_empty() {
        return Err(ProblemError::EmptyWeights);
    }
    if let Some(kpi) = scenario
        .weights
        .keys()
        .find(|kpi| !objective_kpis.contains(*kpi))
    {
        return Err(ProblemError::WeightOnIneligibleKpi { kpi: kpi.clone() });
    }
    for input in scenario.weights.keys() {
        for output in scenario.weights.keys() {
            if input != output && registry.is_causal_input(input, output) {
                warnings.push(ProblemWarning::RedundantWeighting {
                    input: input.clone(),
                    output: output.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Scale per weighted KPI: the scenario override, else the global target.
fn resolve_scales(
    scenario: &Scenario,
    compiled: &CompiledConstraintSet,
) -> Result<BTreeMap<KpiKey, Decimal>, ProblemError> {
    let mut scales = BTreeMap::new();
    for kpi in scenario.weights.keys() {
        let scale = scenario
            .normalization
            .get(kpi)
            .copied()
            .or_else(|| {
                compiled
                    .target(CapacityDimension::All, "", kpi)
                    .map(|spec| spec.value)
            })
            .ok_or_else(|| ProblemError::MissingScale { kpi: kpi.clone() })?;
        if scale <= Decimal::ZERO {
            return Err(ProblemError::NonPositiveScale {
                kpi: kpi.clone(),
                scale,
            });
        }
        scales.insert(kpi.clone(), scale);
    }
    Ok(scales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::ConstraintSetKey;
    use crate::domain::kpi::{KpiCatalog, KpiDefinition, KpiLevel};
    use crate::domain::model::ObjectiveSense;
    use crate::domain::compiled::TargetSpec;
    use crate::domain::row::TargetKind;
    use rust_decimal_macros::dec;

    fn catalog() -> KpiCatalog {
        KpiCatalog::new([
            KpiDefinition::new("revenue", Some(KpiLevel::NorthStar)),
            KpiDefinition::new("retention", Some(KpiLevel::Strategic)).feeding("revenue"),
            KpiDefinition::new("clicks", None),
        ])
        .unwrap()
    }

    fn set() -> CompiledConstraintSet {
        CompiledConstraintSet::new(ConstraintSetKey::new("base", "default"))
    }

    fn pool() -> Vec<Candidate> {
        vec![
            Candidate::new("B", dec!(200)).with_contribution("revenue", dec!(50)),
            Candidate::new("A", dec!(100)).with_contribution("revenue", dec!(80)),
        ]
    }

    #[test]
    fn pool_is_sorted_and_variables_follow_it() {
        let problem = build(&Scenario::new("base"), &set(), &pool(), &catalog()).unwrap();
        assert_eq!(problem.candidates[0].id.as_str(), "A");
        assert_eq!(problem.model.variables[0].name, "x[A]");
        assert_eq!(problem.primary_kpi, Some(KpiKey::from("revenue")));
    }

    #[test]
    fn duplicate_candidates_are_rejected() {
        let mut candidates = pool();
        candidates.push(Candidate::new("A", dec!(1)));
        let err = build(&Scenario::new("base"), &set(), &candidates, &catalog()).unwrap_err();
        assert!(matches!(err, ProblemError::DuplicateCandidate { .. }));
    }

    #[test]
    fn scenario_must_match_set() {
        let err = build(&Scenario::new("other"), &set(), &pool(), &catalog()).unwrap_err();
        assert!(matches!(err, ProblemError::ScenarioMismatch { .. }));
    }

    #[test]
    fn weights_outside_weighted_mode_are_rejected() {
        let scenario = Scenario::new("base").with_weight("revenue", dec!(1));
        let err = build(&scenario, &set(), &pool(), &catalog()).unwrap_err();
        assert!(matches!(err, ProblemError::WeightsNotAllowed { .. }));
    }

    #[test]
    fn weight_on_supporting_metric_is_rejected() {
        let scenario = Scenario::new("base")
            .with_objective(ObjectiveMode::WeightedKpis)
            .with_weight("clicks", dec!(1));
        let err = build(&scenario, &set(), &pool(), &catalog()).unwrap_err();
        assert!(matches!(err, ProblemError::WeightOnIneligibleKpi { .. }));
    }

    #[test]
    fn weighted_mode_needs_a_scale() {
        let scenario = Scenario::new("base")
            .with_objective(ObjectiveMode::WeightedKpis)
            .with_weight("revenue", dec!(1));
        let err = build(&scenario, &set(), &pool(), &catalog()).unwrap_err();
        assert!(matches!(err, ProblemError::MissingScale { .. }));
    }

    #[test]
    fn weighted_mode_uses_global_target_as_scale() {
        let mut compiled = set();
        compiled
            .targets
            .entry(CapacityDimension::All)
            .or_default()
            .entry(String::new())
            .or_default()
            .insert(
                "revenue".into(),
                TargetSpec {
                    kind: TargetKind::Goal,
                    value: dec!(200),
                    notes: None,
                },
            );
        let mut scenario = Scenario::new("base")
            .with_objective(ObjectiveMode::WeightedKpis)
            .with_weight("revenue", dec!(2))
            .with_weight("retention", dec!(1));
        scenario.normalization.insert("retention".into(), dec!(10));
        let problem = build(&scenario, &compiled, &pool(), &catalog()).unwrap();
        assert_eq!(problem.normalization[&KpiKey::from("revenue")], dec!(200));
        // A: 2 * 80 / 200
        let stage = &problem.stages[0];
        assert_eq!(stage.terms[0], (0, dec!(0.8)));
        assert!(problem
            .warnings
            .iter()
            .any(|w| matches!(w, ProblemWarning::RedundantWeighting { .. })));
    }

    #[test]
    fn contributions_to_supporting_metrics_warn() {
        let candidates = vec![Candidate::new("A", dec!(1)).with_contribution("clicks", dec!(9))];
        let problem = build(&Scenario::new("base"), &set(), &candidates, &catalog()).unwrap();
        assert!(matches!(
            problem.warnings[0],
            ProblemWarning::IgnoredContribution { .. }
        ));
    }

    #[test]
    fn no_north_star_fails_north_star_mode() {
        let registry = KpiCatalog::new([KpiDefinition::new("nps", Some(KpiLevel::Strategic))]).unwrap();
        let err = build(&Scenario::new("base"), &set(), &pool(), &registry).unwrap_err();
        assert!(matches!(err, ProblemError::NoNorthStar { .. }));
    }

    #[test]
    fn global_capacity_is_the_tighter_bound() {
        let mut compiled = set();
        compiled
            .caps
            .entry(CapacityDimension::All)
            .or_default()
            .insert(String::new(), dec!(250));
        let scenario = Scenario::new("base").with_total_capacity(dec!(400));
        let problem = build(&scenario, &compiled, &pool(), &catalog()).unwrap();
        assert_eq!(problem.global_capacity, Some(dec!(250)));
    }

    #[test]
    fn lexicographic_mode_has_feasibility_then_primary_then_tie_breaks() {
        let scenario = Scenario::new("base").with_objective(ObjectiveMode::Lexicographic);
        let problem = build(&scenario, &set(), &pool(), &catalog()).unwrap();
        let labels: Vec<&str> = problem.stages.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["feasibility", "primary[revenue]", "fewest_selected", "fewest_tokens"]
        );
        assert_eq!(problem.primary_stage, 1);
        assert_eq!(problem.stages[1].sense, ObjectiveSense::Maximize);
    }

    #[test]
    fn lexicographic_primary_must_be_objective_kpi() {
        let scenario = Scenario::new("base")
            .with_objective(ObjectiveMode::Lexicographic)
            .with_primary_kpi("clicks");
        let err = build(&scenario, &set(), &pool(), &catalog()).unwrap_err();
        assert!(matches!(err, ProblemError::InvalidPrimaryKpi { .. }));
    }
}
