//! End-to-end solves on HiGHS, cross-checked against exhaustive search.

mod support;

use std::sync::Arc;
use std::time::Duration;

use portfolio_solver::adapter::outbound::solver::HighsSolver;
use portfolio_solver::application::{build, compile, map_staged, solve_staged, PlanRunner, RunOutcome};
use portfolio_solver::domain::{
    Candidate, CompiledConstraintSet, ConstraintRow, ConstraintSetKey, IssueCode, ObjectiveMode,
    OptimizationProblem, OptimizationSolution, Scenario, SolutionStatus, TargetKind, TargetRow,
};
use portfolio_solver::port::{KpiRegistry, MilpSolver};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use support::assertions::{assert_decimal_near, assert_selected};
use support::fixtures::{
    bundle, candidate, cap, catalog, exclude_pair, floor, mandatory, pool, prereq, synergy,
    target, SCENARIO, SET,
};
use support::solver::BruteForce;

fn problem_with(
    scenario: &Scenario,
    rows: &[ConstraintRow],
    targets: &[TargetRow],
    candidates: &[Candidate],
) -> OptimizationProblem {
    let out = compile(rows, targets, &catalog().valid_kpi_keys());
    assert!(!out.has_errors(), "fixture rows failed validation: {:?}", out.messages);
    let key = ConstraintSetKey::new(SCENARIO, SET);
    let set = out
        .get(&key)
        .cloned()
        .unwrap_or_else(|| CompiledConstraintSet::new(key));
    build(scenario, &set, candidates, &catalog()).expect("problem builds")
}

fn problem(rows: &[ConstraintRow]) -> OptimizationProblem {
    problem_with(&Scenario::new(SCENARIO), rows, &[], &pool())
}

fn solve_on(solver: &dyn MilpSolver, problem: &OptimizationProblem) -> OptimizationSolution {
    let output = solve_staged(solver, problem).expect("solver runs");
    map_staged(&output, problem, solver.name())
}

/// Solve on HiGHS and on brute force; both must agree.
fn solve(problem: &OptimizationProblem) -> OptimizationSolution {
    let highs = solve_on(&HighsSolver::new(), problem);
    let reference = solve_on(&BruteForce, problem);
    assert_eq!(highs.status, SolutionStatus::Optimal, "{:?}", highs.diagnostics);
    assert_eq!(reference.status, SolutionStatus::Optimal);
    assert_eq!(highs.objective_value, reference.objective_value);
    assert_eq!(highs.selected, reference.selected);
    assert!(highs.diagnostics.consistency_error.is_none());
    highs
}

#[test]
fn global_cap_picks_the_best_affordable_subset() {
    let solution = solve(&problem(&[cap("all", "", dec!(300))]));

    assert_selected(&solution, &["A", "B"]);
    assert_eq!(solution.objective_value, Some(dec!(130)));
    assert_eq!(solution.tokens_used, dec!(300));
    assert_eq!(solution.allocations[&"B".into()], dec!(200));
    assert_eq!(solution.diagnostics.solver, "highs");
}

#[test]
fn excluded_pair_partner_of_a_mandatory_is_never_selected() {
    let rows = vec![cap("all", "", dec!(600)), exclude_pair("A", "B"), mandatory("A")];
    let solution = solve(&problem(&rows));

    assert_selected(&solution, &["A", "C"]);
    assert!(!solution.is_selected(&"B".into()));
}

#[test]
fn bundle_that_does_not_fit_is_dropped_whole() {
    let candidates = vec![
        candidate("X", dec!(100), "UK", dec!(100)),
        candidate("Y", dec!(100), "UK", dec!(100)),
        candidate("Z", dec!(100), "UK", dec!(100)),
        candidate("W", dec!(50), "DE", dec!(10)),
    ];
    let rows = vec![cap("all", "", dec!(250)), bundle("launch", &["X", "Y", "Z"])];
    let solution = solve(&problem_with(&Scenario::new(SCENARIO), &rows, &[], &candidates));

    assert_selected(&solution, &["W"]);
    assert_eq!(solution.objective_value, Some(dec!(10)));
}

#[test]
fn bundle_with_a_member_outside_the_pool_is_never_selected() {
    let candidates = vec![
        candidate("X", dec!(100), "UK", dec!(100)),
        candidate("Y", dec!(100), "UK", dec!(100)),
        candidate("W", dec!(50), "DE", dec!(10)),
    ];
    let rows = vec![cap("all", "", dec!(250)), bundle("launch", &["X", "Y", "Z"])];
    let solution = solve(&problem_with(&Scenario::new(SCENARIO), &rows, &[], &candidates));

    assert_selected(&solution, &["W"]);
    assert_eq!(solution.objective_value, Some(dec!(10)));
}

#[test]
fn prerequisites_pull_in_their_requirements() {
    let candidates = vec![
        candidate("A", dec!(100), "UK", dec!(0)),
        candidate("B", dec!(100), "UK", dec!(90)),
        candidate("C", dec!(150), "DE", dec!(70)),
    ];
    let rows = vec![cap("all", "", dec!(250)), prereq("B", &["A"])];
    let solution = solve(&problem_with(&Scenario::new(SCENARIO), &rows, &[], &candidates));

    assert_selected(&solution, &["A", "B"]);
    assert_eq!(solution.objective_value, Some(dec!(90)));
}

#[test]
fn synergy_bonus_can_change_the_selection() {
    let rows = vec![cap("all", "", dec!(400))];
    let plain = solve(&problem(&rows));
    assert_selected(&plain, &["A", "C"]);
    assert_eq!(plain.objective_value, Some(dec!(140)));

    let mut scenario = Scenario::new(SCENARIO);
    scenario.synergy_bonus_weight = dec!(20);
    let mut boosted_rows = rows.clone();
    boosted_rows.push(synergy("A", "B"));
    let boosted = solve(&problem_with(&scenario, &boosted_rows, &[], &pool()));
    assert_selected(&boosted, &["A", "B"]);
    assert_eq!(boosted.objective_value, Some(dec!(150)));
}

#[test]
fn slice_floor_forces_spend_in_that_slice() {
    let rows = vec![cap("all", "", dec!(300)), floor("country", "DE", dec!(300))];
    let solution = solve(&problem(&rows));

    assert_selected(&solution, &["C"]);
    assert_eq!(solution.tokens_used, dec!(300));
}

#[test]
fn goal_gaps_are_reported_per_target() {
    let targets = vec![
        target("all", "", "revenue", "goal", dec!(200)),
        target("country", "UK", "revenue", "floor", dec!(100)),
    ];
    let solution = solve(&problem_with(
        &Scenario::new(SCENARIO),
        &[cap("all", "", dec!(300))],
        &targets,
        &pool(),
    ));

    assert_selected(&solution, &["A", "B"]);
    let goal = solution
        .gaps
        .iter()
        .find(|g| g.kind == TargetKind::Goal)
        .expect("goal gap");
    assert_eq!(goal.achieved, dec!(130));
    assert_eq!(goal.gap, dec!(-70));
    let floor = solution
        .gaps
        .iter()
        .find(|g| g.kind == TargetKind::Floor)
        .expect("floor gap");
    assert_eq!(floor.achieved, dec!(130));
    assert_eq!(floor.gap, Decimal::ZERO);
}

#[test]
fn lexicographic_mode_respects_floor_targets_first() {
    let scenario = Scenario::new(SCENARIO).with_objective(ObjectiveMode::Lexicographic);
    let targets = vec![target("country", "DE", "revenue", "floor", dec!(60))];
    let problem = problem_with(&scenario, &[cap("all", "", dec!(300))], &targets, &pool());
    let solution = solve_on(&HighsSolver::new(), &problem);

    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert_selected(&solution, &["C"]);
    assert_eq!(solution.objective_value, Some(dec!(60)));
    assert!(solution.diagnostics.stages.len() >= 3);
}

#[test]
fn weighted_mode_scales_contributions() {
    let mut scenario = Scenario::new(SCENARIO)
        .with_objective(ObjectiveMode::WeightedKpis)
        .with_weight("revenue", Decimal::ONE);
    scenario.normalization.insert("revenue".into(), dec!(100));
    let solution = solve(&problem_with(
        &scenario,
        &[cap("all", "", dec!(300))],
        &[],
        &pool(),
    ));

    assert_selected(&solution, &["A", "B"]);
    assert_decimal_near(
        solution.objective_value.expect("objective"),
        dec!(1.3),
        dec!(0.000001),
    );
}

#[tokio::test]
async fn runner_rejects_floors_beyond_capacity_without_solving() {
    let rows = vec![
        cap("all", "", dec!(500)),
        floor("country", "UK", dec!(300)),
        floor("country", "DE", dec!(300)),
    ];
    let runner = PlanRunner::new(Arc::new(HighsSolver::new()), Duration::from_secs(30));
    let outcome = runner.run(problem(&rows)).await;

    match outcome {
        RunOutcome::Rejected(report) => {
            assert!(report.has_error(IssueCode::FloorsExceedCapacity));
        }
        RunOutcome::Solved { .. } => panic!("expected the run to be rejected"),
    }
}

#[tokio::test]
async fn runner_solves_a_feasible_problem() {
    let runner = PlanRunner::new(Arc::new(HighsSolver::new()), Duration::from_secs(30));
    assert_eq!(runner.solver_name(), "highs");

    let outcome = runner.run(problem(&[cap("all", "", dec!(300))])).await;
    assert!(outcome.report().is_feasible);
    let solution = outcome.solution().expect("solved");
    assert_eq!(solution.status, SolutionStatus::Optimal);
    assert_selected(solution, &["A", "B"]);
    assert!(!solution.diagnostics.stages.is_empty());
}

/// Candidates whose primary values tie exactly: the tie-break stages decide.
fn tied(candidates: &[Candidate], cap_tokens: Decimal) -> OptimizationSolution {
    let rows = vec![cap("all", "", cap_tokens)];
    solve(&problem_with(&Scenario::new(SCENARIO), &rows, &[], candidates))
}

#[test]
fn equal_objective_prefers_fewer_selections() {
    let candidates = vec![
        candidate("A", dec!(200), "UK", dec!(100)),
        candidate("B", dec!(100), "UK", dec!(60)),
        candidate("C", dec!(100), "DE", dec!(40)),
    ];
    let solution = tied(&candidates, dec!(200));

    assert_selected(&solution, &["A"]);
    assert_eq!(solution.objective_value, Some(dec!(100)));
}

#[test]
fn equal_objective_and_count_prefers_fewer_tokens() {
    let candidates = vec![
        candidate("A", dec!(100), "UK", dec!(30)),
        candidate("B", dec!(100), "UK", dec!(30)),
        candidate("C", dec!(150), "DE", dec!(30)),
        candidate("D", dec!(150), "DE", dec!(30)),
    ];
    let solution = tied(&candidates, dec!(300));

    assert_selected(&solution, &["A", "B"]);
    assert_eq!(solution.objective_value, Some(dec!(60)));
    assert_eq!(solution.tokens_used, dec!(200));
}

#[test]
fn tie_breaks_never_give_up_primary_value_at_large_magnitude() {
    let candidates = vec![
        candidate("A", dec!(100), "UK", dec!(1000000)),
        candidate("B", dec!(100), "UK", dec!(1)),
        candidate("C", dec!(200), "DE", dec!(1000000)),
    ];
    let rows = vec![cap("all", "", dec!(200))];
    let problem = problem_with(&Scenario::new(SCENARIO), &rows, &[], &candidates);

    let reference = solve_on(&BruteForce, &problem);
    assert_eq!(reference.status, SolutionStatus::Optimal);
    assert_selected(&reference, &["A", "B"]);
    assert_eq!(reference.objective_value, Some(dec!(1000001)));

    let highs = solve_on(&HighsSolver::new().with_mip_rel_gap(0.0), &problem);
    assert_eq!(highs.status, SolutionStatus::Optimal, "{:?}", highs.diagnostics);
    assert_selected(&highs, &["A", "B"]);
    assert_eq!(highs.objective_value, Some(dec!(1000001)));
}
