//! Pre-solve feasibility checks on problems built from compiled rows.

mod support;

use portfolio_solver::application::{build, check, compile};
use portfolio_solver::domain::{
    Candidate, CompiledConstraintSet, ConstraintRow, ConstraintSetKey, IssueCode,
    OptimizationProblem, RuleRef, Scenario, TargetRow,
};
use portfolio_solver::error::ProblemError;
use portfolio_solver::port::KpiRegistry;
use rust_decimal_macros::dec;

use support::fixtures::{
    bundle, cap, catalog, exclude, exclude_pair, floor, mandatory, pool, prereq, synergy, target,
    SCENARIO, SET,
};

fn compiled(rows: &[ConstraintRow], targets: &[TargetRow]) -> CompiledConstraintSet {
    let out = compile(rows, targets, &catalog().valid_kpi_keys());
    assert!(!out.has_errors(), "fixture rows failed validation: {:?}", out.messages);
    out.get(&ConstraintSetKey::new(SCENARIO, SET))
        .cloned()
        .unwrap_or_else(|| CompiledConstraintSet::new(ConstraintSetKey::new(SCENARIO, SET)))
}

fn problem_with(
    scenario: &Scenario,
    rows: &[ConstraintRow],
    targets: &[TargetRow],
    candidates: &[Candidate],
) -> OptimizationProblem {
    build(scenario, &compiled(rows, targets), candidates, &catalog()).expect("problem builds")
}

fn problem(rows: &[ConstraintRow], targets: &[TargetRow]) -> OptimizationProblem {
    problem_with(&Scenario::new(SCENARIO), rows, targets, &pool())
}

#[test]
fn consistent_rules_pass() {
    let rows = vec![
        cap("all", "", dec!(400)),
        floor("country", "UK", dec!(100)),
        mandatory("A"),
        prereq("B", &["A"]),
    ];
    let report = check(&problem(&rows, &[]));

    assert!(report.is_feasible, "{:?}", report.errors);
    assert!(report.errors.is_empty());
    assert_eq!(report.details.global_capacity, Some(dec!(400)));
    assert_eq!(report.details.mandatory_tokens, dec!(100));
}

#[test]
fn mandatory_and_excluded_is_reported_with_both_rules() {
    let report = check(&problem(&[mandatory("A"), exclude("A")], &[]));

    assert!(!report.is_feasible);
    let issue = report
        .errors
        .iter()
        .find(|e| e.code == IssueCode::MandatoryExcluded)
        .expect("contradiction reported");
    assert!(issue.rules.contains(&RuleRef::Mandatory { id: "A".into() }));
    assert!(issue
        .rules
        .contains(&RuleRef::ExcludeInitiative { id: "A".into() }));
    assert!(issue.to_string().contains("mandatory[A]"));
}

#[test]
fn slice_floors_above_global_capacity() {
    let rows = vec![
        cap("all", "", dec!(500)),
        floor("country", "UK", dec!(300)),
        floor("country", "DE", dec!(300)),
    ];
    let report = check(&problem(&rows, &[]));

    assert!(report.has_error(IssueCode::FloorsExceedCapacity));
    let totals = &report.details.floor_totals;
    assert_eq!(totals.values().copied().sum::<rust_decimal::Decimal>(), dec!(600));
}

#[test]
fn mandatory_cost_above_capacity() {
    let rows = vec![cap("all", "", dec!(400)), mandatory("B"), mandatory("C")];
    let report = check(&problem(&rows, &[]));

    assert!(report.has_error(IssueCode::ForcedCostExceedsCapacity));
    assert_eq!(report.details.mandatory_tokens, dec!(500));
}

#[test]
fn scenario_capacity_tightens_the_all_cap() {
    let scenario = Scenario::new(SCENARIO).with_total_capacity(dec!(250));
    let rows = vec![cap("all", "", dec!(500)), mandatory("C")];
    let report = check(&problem_with(&scenario, &rows, &[], &pool()));

    assert_eq!(report.details.global_capacity, Some(dec!(250)));
    assert!(report.has_error(IssueCode::ForcedCostExceedsCapacity));
}

#[test]
fn prerequisite_cycle_is_an_error() {
    let report = check(&problem(&[prereq("A", &["B"]), prereq("B", &["A"])], &[]));

    let cycles: Vec<_> = report
        .errors
        .iter()
        .filter(|e| e.code == IssueCode::PrerequisiteCycle)
        .collect();
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].message.contains("->"));
}

#[test]
fn mandatory_member_of_excluded_pair_rules_out_its_partner() {
    let report = check(&problem(&[exclude_pair("A", "B"), mandatory("A")], &[]));

    assert!(report.is_feasible);
    assert!(report.details.forced_exclusions.contains(&"B".into()));
}

#[test]
fn both_members_of_excluded_pair_forced() {
    let rows = vec![exclude_pair("A", "B"), mandatory("A"), prereq("A", &["B"])];
    let report = check(&problem(&rows, &[]));

    assert!(report.has_error(IssueCode::ExcludedPairForced));
}

#[test]
fn bundle_with_excluded_member_never_selectable() {
    let rows = vec![bundle("uk", &["A", "B"]), exclude("B")];
    let report = check(&problem(&rows, &[]));
    assert!(report.is_feasible);
    assert!(report.has_warning(IssueCode::BundleNeverSelectable));

    let mut forced = rows.clone();
    forced.push(mandatory("A"));
    let report = check(&problem(&forced, &[]));
    assert!(report.has_error(IssueCode::BundleConflict));
}

#[test]
fn bundle_with_member_outside_pool_never_selectable() {
    let rows = vec![bundle("launch", &["A", "B", "Z"])];
    let report = check(&problem(&rows, &[]));
    assert!(report.is_feasible, "{:?}", report.errors);
    assert!(report.has_warning(IssueCode::BundleNeverSelectable));
    assert!(report.has_warning(IssueCode::UnknownCandidate));

    let mut forced = rows.clone();
    forced.push(mandatory("A"));
    let report = check(&problem(&forced, &[]));
    assert!(report.has_error(IssueCode::BundleConflict));
}

#[test]
fn floor_without_enough_eligible_candidates() {
    let rows = vec![floor("country", "DE", dec!(400))];
    let report = check(&problem(&rows, &[]));

    assert!(report.has_error(IssueCode::FloorUnreachable));
}

#[test]
fn unreachable_targets_by_kind() {
    let hard = vec![target("all", "", "revenue", "floor", dec!(500))];
    let report = check(&problem(&[], &hard));
    assert!(report.has_error(IssueCode::TargetUnreachable));

    let soft = vec![target("all", "", "revenue", "goal", dec!(500))];
    let report = check(&problem(&[], &soft));
    assert!(report.is_feasible);
    assert!(report.has_warning(IssueCode::TargetUnreachable));

    let reachable = vec![target("country", "UK", "revenue", "floor", dec!(130))];
    assert!(check(&problem(&[], &reachable)).is_feasible);
}

#[test]
fn rules_on_unknown_candidates() {
    let report = check(&problem(&[exclude("Z"), synergy("A", "Q")], &[]));
    assert!(report.is_feasible);
    assert!(report.has_warning(IssueCode::UnknownCandidate));

    let report = check(&problem(&[mandatory("Z")], &[]));
    assert!(report.has_error(IssueCode::UnknownCandidate));
}

#[test]
fn report_serializes_with_issue_codes() {
    let report = check(&problem(&[mandatory("A"), exclude("A")], &[]));
    let json = serde_json::to_value(&report).expect("serialize");

    assert_eq!(json["is_feasible"], false);
    assert_eq!(json["errors"][0]["code"], "mandatory_excluded");
}

#[test]
fn builder_rejects_mismatched_scenario() {
    let set = compiled(&[mandatory("A")], &[]);
    let err = build(&Scenario::new("downturn"), &set, &pool(), &catalog())
        .expect_err("scenario mismatch");

    assert!(matches!(err, ProblemError::ScenarioMismatch { .. }));
}

#[test]
fn builder_rejects_duplicate_candidates() {
    let mut candidates = pool();
    candidates.push(candidates[0].clone());
    let set = compiled(&[], &[]);
    let err = build(&Scenario::new(SCENARIO), &set, &candidates, &catalog())
        .expect_err("duplicate pool entry");

    assert_eq!(err, ProblemError::DuplicateCandidate { id: "A".into() });
}
