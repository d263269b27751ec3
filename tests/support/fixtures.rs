//! Row, candidate and catalog builders shared by the integration tests.

use portfolio_solver::domain::{
    Candidate, CapacityDimension, ConstraintRow, KpiCatalog, KpiDefinition, KpiLevel, TargetRow,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const SCENARIO: &str = "base";
pub const SET: &str = "default";

/// `revenue` (North Star), `retention` (Strategic), `conversion` (feeds revenue).
pub fn catalog() -> KpiCatalog {
    KpiCatalog::new([
        KpiDefinition::new("revenue", Some(KpiLevel::NorthStar)),
        KpiDefinition::new("retention", Some(KpiLevel::Strategic)),
        KpiDefinition::new("conversion", None).feeding("revenue"),
    ])
    .expect("valid catalog")
}

pub fn candidate(id: &str, tokens: Decimal, country: &str, revenue: Decimal) -> Candidate {
    Candidate::new(id, tokens)
        .with_dimension(CapacityDimension::Country, country)
        .with_contribution("revenue", revenue)
}

/// A(100, UK, 80), B(200, UK, 50), C(300, DE, 60).
pub fn pool() -> Vec<Candidate> {
    vec![
        candidate("A", dec!(100), "UK", dec!(80)),
        candidate("B", dec!(200), "UK", dec!(50)),
        candidate("C", dec!(300), "DE", dec!(60)),
    ]
}

fn row(constraint_type: &str, dimension: &str, key: &str) -> ConstraintRow {
    ConstraintRow {
        scenario_name: SCENARIO.into(),
        constraint_set_name: SET.into(),
        constraint_type: constraint_type.into(),
        dimension: dimension.into(),
        dimension_key: key.into(),
        ..ConstraintRow::default()
    }
}

pub fn cap(dimension: &str, key: &str, max_tokens: Decimal) -> ConstraintRow {
    ConstraintRow {
        max_tokens: Some(max_tokens),
        ..row("capacity_cap", dimension, key)
    }
}

pub fn floor(dimension: &str, key: &str, min_tokens: Decimal) -> ConstraintRow {
    ConstraintRow {
        min_tokens: Some(min_tokens),
        ..row("capacity_floor", dimension, key)
    }
}

pub fn mandatory(id: &str) -> ConstraintRow {
    row("mandatory", "initiative", id)
}

pub fn exclude(id: &str) -> ConstraintRow {
    row("exclude_initiative", "initiative", id)
}

pub fn exclude_pair(a: &str, b: &str) -> ConstraintRow {
    ConstraintRow {
        pair_member_key: Some(b.into()),
        ..row("exclude_pair", "initiative", a)
    }
}

pub fn synergy(a: &str, b: &str) -> ConstraintRow {
    ConstraintRow {
        pair_member_key: Some(b.into()),
        ..row("synergy_bonus", "initiative", a)
    }
}

pub fn bundle(key: &str, members: &[&str]) -> ConstraintRow {
    ConstraintRow {
        bundle_member_keys: members.iter().map(|m| (*m).to_string()).collect(),
        ..row("bundle_all_or_nothing", "bundle", key)
    }
}

pub fn prereq(dependent: &str, required: &[&str]) -> ConstraintRow {
    ConstraintRow {
        prereq_member_keys: required.iter().map(|m| (*m).to_string()).collect(),
        ..row("require_prereq", "initiative", dependent)
    }
}

pub fn target(dimension: &str, key: &str, kpi: &str, kind: &str, value: Decimal) -> TargetRow {
    TargetRow {
        row_number: None,
        scenario_name: SCENARIO.into(),
        constraint_set_name: SET.into(),
        dimension: dimension.into(),
        dimension_key: key.into(),
        kpi_key: kpi.into(),
        floor_or_goal: kind.into(),
        target_value: Some(value),
        notes: None,
    }
}
