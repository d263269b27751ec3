use portfolio_solver::domain::{CandidateId, OptimizationSolution};
use rust_decimal::Decimal;

pub fn assert_decimal_near(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// Assert the selection is exactly `expected`, in any order.
pub fn assert_selected(solution: &OptimizationSolution, expected: &[&str]) {
    let mut actual: Vec<&str> = solution.selected.iter().map(CandidateId::as_str).collect();
    actual.sort_unstable();
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    assert_eq!(
        actual, expected,
        "unexpected selection (status {})",
        solution.status
    );
}
