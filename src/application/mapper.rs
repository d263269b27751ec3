//! Raw solver output -> typed [`OptimizationSolution`].

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{error, info};

use super::solve::StagedOutput;
use crate::domain::dimension::CapacityDimension;
use crate::domain::id::CandidateId;
use crate::domain::model::VariableKind;
use crate::domain::problem::OptimizationProblem;
use crate::domain::row::TargetKind;
use crate::domain::solution::{
    AchievedTable, OptimizationSolution, SolutionStatus, SolverDiagnostics, TargetGap,
};
use crate::port::{RawSolverOutput, RawStatus};

/// Slack allowed when re-checking a returned assignment.
const CHECK_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Map one raw output against the problem it was produced for.
#[must_use]
pub fn map(raw: &RawSolverOutput, problem: &OptimizationProblem) -> OptimizationSolution {
    let diagnostics = SolverDiagnostics {
        solve_time_ms: u64::try_from(raw.elapsed.as_millis()).unwrap_or(u64::MAX),
        iterations: raw.iterations,
        ..SolverDiagnostics::default()
    };

    let status = match &raw.status {
        RawStatus::Optimal => SolutionStatus::Optimal,
        RawStatus::LimitReached => SolutionStatus::FeasibleSuboptimal,
        RawStatus::Infeasible => {
            error!(
                scenario = %problem.scenario.name,
                set = %problem.compiled.key,
                "solver reports infeasible after a clean feasibility check"
            );
            return OptimizationSolution::empty(
                SolutionStatus::Infeasible,
                SolverDiagnostics {
                    consistency_error: Some(
                        "solver found no feasible assignment although the pre-solve check passed"
                            .into(),
                    ),
                    ..diagnostics
                },
            );
        }
        RawStatus::Unbounded => {
            return OptimizationSolution::empty(
                SolutionStatus::SolverError,
                SolverDiagnostics {
                    message: Some("solver reports the model as unbounded".into()),
                    ..diagnostics
                },
            );
        }
        RawStatus::Failed(msg) => {
            return OptimizationSolution::empty(
                SolutionStatus::SolverError,
                SolverDiagnostics {
                    message: Some(msg.clone()),
                    ..diagnostics
                },
            );
        }
    };

    let values = rounded(raw, problem);
    if let Some(violation) = problem.model.first_violation(&values, CHECK_TOLERANCE) {
        error!(scenario = %problem.scenario.name, %violation, "solver assignment breaks a hard constraint");
        return OptimizationSolution::empty(
            SolutionStatus::SolverError,
            SolverDiagnostics {
                consistency_error: Some(violation),
                ..diagnostics
            },
        );
    }

    let mut selected = BTreeSet::new();
    let mut allocations = BTreeMap::new();
    for (candidate, value) in problem.candidates.iter().zip(&values) {
        if *value == Decimal::ONE {
            selected.insert(candidate.id.clone());
            allocations.insert(candidate.id.clone(), candidate.token_cost);
        }
    }
    let tokens_used = allocations.values().copied().sum();
    let achieved = achieved(problem, &selected);
    let gaps = gaps(problem, &achieved);
    let objective_value = problem
        .stages
        .get(problem.primary_stage)
        .map(|stage| stage.evaluate(&values).normalize());

    info!(
        scenario = %problem.scenario.name,
        %status,
        selected = selected.len(),
        %tokens_used,
        objective = ?objective_value,
        "solution mapped"
    );

    OptimizationSolution {
        status,
        selected,
        allocations,
        tokens_used,
        achieved,
        gaps,
        objective_value,
        diagnostics,
    }
}

/// Map a staged solve, attaching the solver name and stage trail.
#[must_use]
pub fn map_staged(
    output: &StagedOutput,
    problem: &OptimizationProblem,
    solver: &str,
) -> OptimizationSolution {
    let mut solution = map(&output.raw, problem);
    solution.diagnostics.solver = solver.to_string();
    solution.diagnostics.stages = output.stages.clone();
    solution
}

/// Binary variables snap to 0/1 at 0.5; continuous ones are kept.
fn rounded(raw: &RawSolverOutput, problem: &OptimizationProblem) -> Vec<Decimal> {
    let half = Decimal::new(5, 1);
    raw.values
        .iter()
        .zip(&problem.model.variables)
        .map(|(value, var)| match var.kind {
            VariableKind::Binary if *value >= half => Decimal::ONE,
            VariableKind::Binary => Decimal::ZERO,
            VariableKind::Continuous => *value,
        })
        .collect()
}

/// KPI totals of the selection per target slice, plus global totals for
/// every KPI the selection contributes to.
fn achieved(
    problem: &OptimizationProblem,
    selected: &BTreeSet<CandidateId>,
) -> AchievedTable {
    let chosen: Vec<_> = problem
        .candidates
        .iter()
        .filter(|c| selected.contains(&c.id))
        .collect();
    let mut table = AchievedTable::new();

    for candidate in &chosen {
        for (kpi, value) in &candidate.kpi_contributions {
            *table
                .entry(CapacityDimension::All)
                .or_default()
                .entry(String::new())
                .or_default()
                .entry(kpi.clone())
                .or_insert(Decimal::ZERO) += *value;
        }
    }
    for (dimension, key, kpi, _) in problem.compiled.iter_targets() {
        let total: Decimal = chosen
            .iter()
            .filter(|c| c.matches(dimension, key))
            .map(|c| c.contribution(kpi))
            .sum();
        table
            .entry(dimension)
            .or_default()
            .entry(key.to_string())
            .or_default()
            .insert(kpi.clone(), total);
    }
    table
}

fn gaps(problem: &OptimizationProblem, achieved: &AchievedTable) -> Vec<TargetGap> {
    problem
        .compiled
        .iter_targets()
        .map(|(dimension, key, kpi, spec)| {
            let value = achieved
                .get(&dimension)
                .and_then(|slices| slices.get(key))
                .and_then(|kpis| kpis.get(kpi))
                .copied()
                .unwrap_or(Decimal::ZERO);
            let gap = match spec.kind {
                TargetKind::Floor => (spec.value - value).max(Decimal::ZERO),
                TargetKind::Goal => value - spec.value,
            };
            TargetGap {
                dimension,
                dimension_key: key.to_string(),
                kpi_key: kpi.clone(),
                kind: spec.kind,
                target: spec.value,
                achieved: value,
                gap,
            }
        })
        .collect()
}
