//! Per-row validation.
//!
//! Each row is checked on its own: no function here looks at any other row.
//! A hard problem becomes `Err(ValidationMessage)`; soft problems ride along
//! as warnings on the [`Validated`] result.

use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::dimension::{CapacityDimension, Dimension};
use crate::domain::id::{CandidateId, IdPair, KpiKey};
use crate::domain::row::{ConstraintRow, ConstraintType, RowIdentity, TargetKind, TargetRow};
use crate::domain::rule::{ConstraintRule, TargetRule};
use crate::domain::validation::{Validated, ValidationCode, ValidationMessage};

type Checked<T> = Result<T, ValidationMessage>;

/// Validate one constraint row.
///
/// `row_number` is used when the row does not carry its own.
pub fn validate_constraint_row(
    row: &ConstraintRow,
    row_number: usize,
) -> Checked<Validated<ConstraintRule>> {
    let identity = RowIdentity::of_constraint(row, row.row_number.unwrap_or(row_number));
    let ctx = RowCheck {
        identity: &identity,
        warnings: Vec::new(),
    };
    ctx.validate_constraint(row)
}

/// Validate one target row against the registry's KPI keys.
pub fn validate_target_row(
    row: &TargetRow,
    row_number: usize,
    valid_kpi_keys: &BTreeSet<KpiKey>,
) -> Checked<Validated<TargetRule>> {
    let identity = RowIdentity::of_target(row, row.row_number.unwrap_or(row_number));
    let ctx = RowCheck {
        identity: &identity,
        warnings: Vec::new(),
    };
    ctx.validate_target(row, valid_kpi_keys)
}

struct RowCheck<'a> {
    identity: &'a RowIdentity,
    warnings: Vec<ValidationMessage>,
}

impl RowCheck<'_> {
    fn error(&self, code: ValidationCode, message: impl Into<String>) -> ValidationMessage {
        ValidationMessage::error(self.identity.clone(), code, message)
    }

    fn warn(&mut self, code: ValidationCode, message: impl Into<String>) {
        self.warnings
            .push(ValidationMessage::warning(self.identity.clone(), code, message));
    }

    fn finish<T>(self, rule: T) -> Checked<Validated<T>> {
        Ok(Validated {
            rule,
            warnings: self.warnings,
        })
    }

    fn required<'s>(&self, field: &'static str, value: &'s str) -> Checked<&'s str> {
        let value = value.trim();
        if value.is_empty() {
            return Err(self.error(
                ValidationCode::MissingField {
                    field: field.to_string(),
                },
                format!("{field} is required"),
            ));
        }
        Ok(value)
    }

    fn non_negative(&self, field: &'static str, value: Option<Decimal>) -> Checked<Decimal> {
        let Some(value) = value else {
            return Err(self.error(
                ValidationCode::MissingField {
                    field: field.to_string(),
                },
                format!("{field} is required"),
            ));
        };
        if value.is_sign_negative() && !value.is_zero() {
            return Err(self.error(
                ValidationCode::NegativeValue {
                    field: field.to_string(),
                },
                format!("{field} must not be negative, got {value}"),
            ));
        }
        Ok(value)
    }

    fn dimension(&self, value: &str) -> Checked<Dimension> {
        let literal = self.required("dimension", value)?;
        Dimension::from_str(literal)
            .map_err(|err| self.error(ValidationCode::UnknownDimension, err.to_string()))
    }

    fn capacity_dimension(&self, value: &str) -> Checked<CapacityDimension> {
        let dimension = self.dimension(value)?;
        dimension.as_capacity().ok_or_else(|| {
            self.error(
                ValidationCode::DimensionNotAllowed,
                format!(
                    "dimension '{dimension}' cannot scope capacity or targets; use country, product, department, category, program or all"
                ),
            )
        })
    }

    /// Slice key for a capacity dimension; `all` only accepts a blank key.
    fn slice_key(&self, dimension: CapacityDimension, key: &str) -> Checked<String> {
        let key = key.trim();
        if dimension.is_global() {
            if key.is_empty() || key.eq_ignore_ascii_case("all") {
                return Ok(String::new());
            }
            return Err(self.error(
                ValidationCode::DimensionKeyNotAllowed,
                format!("dimension 'all' is global and takes no dimension_key, got '{key}'"),
            ));
        }
        Ok(self.required("dimension_key", key)?.to_string())
    }

    fn expect_dimension(&self, value: &str, expected: Dimension, ty: ConstraintType) -> Checked<()> {
        let dimension = self.dimension(value)?;
        if dimension != expected {
            return Err(self.error(
                ValidationCode::DimensionNotAllowed,
                format!("{ty} rows must use dimension '{expected}', got '{dimension}'"),
            ));
        }
        Ok(())
    }

    fn candidate(&self, field: &'static str, value: &str) -> Checked<CandidateId> {
        Ok(CandidateId::new(self.required(field, value)?))
    }

    fn members(&mut self, field: &'static str, values: &[String]) -> Checked<BTreeSet<CandidateId>> {
        let mut seen = HashSet::new();
        let mut members = BTreeSet::new();
        for raw in values {
            let id = CandidateId::new(raw.as_str());
            if id.is_empty() {
                continue;
            }
            if !seen.insert(id.clone()) {
                self.warn(
                    ValidationCode::DuplicateMember,
                    format!("{id} is listed more than once in {field}"),
                );
            }
            members.insert(id);
        }
        if members.is_empty() {
            return Err(self.error(
                ValidationCode::MissingField {
                    field: field.to_string(),
                },
                format!("{field} must list at least one candidate"),
            ));
        }
        Ok(members)
    }

    fn pair(&self, first: CandidateId, second: Option<&str>) -> Checked<IdPair> {
        let second = self.candidate("pair_member_key", second.unwrap_or_default())?;
        IdPair::new(first, second).map_err(|err| self.error(ValidationCode::SelfPair, err.to_string()))
    }

    fn ignore_unused(&mut self, row: &ConstraintRow, ty: ConstraintType) {
        let uses = |field: &str| -> bool {
            matches!(
                (ty, field),
                (ConstraintType::CapacityFloor, "min_tokens")
                    | (ConstraintType::CapacityCap, "max_tokens")
                    | (ConstraintType::BundleAllOrNothing, "bundle_member_keys")
                    | (ConstraintType::RequirePrereq, "prereq_member_keys")
                    | (ConstraintType::ExcludePair | ConstraintType::SynergyBonus, "pair_member_key")
            )
        };
        let present = [
            ("min_tokens", row.min_tokens.is_some()),
            ("max_tokens", row.max_tokens.is_some()),
            ("bundle_member_keys", !row.bundle_member_keys.is_empty()),
            ("prereq_member_keys", !row.prereq_member_keys.is_empty()),
            (
                "pair_member_key",
                row.pair_member_key.as_deref().is_some_and(|s| !s.trim().is_empty()),
            ),
        ];
        for (field, is_set) in present {
            if is_set && !uses(field) {
                self.warn(
                    ValidationCode::IgnoredField {
                        field: field.to_string(),
                    },
                    format!("{field} is ignored on {ty} rows"),
                );
            }
        }
    }

    fn validate_constraint(mut self, row: &ConstraintRow) -> Checked<Validated<ConstraintRule>> {
        self.required("scenario_name", &row.scenario_name)?;
        self.required("constraint_set_name", &row.constraint_set_name)?;
        let literal = self.required("constraint_type", &row.constraint_type)?;
        let ty = ConstraintType::from_str(literal).map_err(|err| {
            self.error(
                ValidationCode::UnknownConstraintType,
                format!("unknown constraint_type '{}'", err.0),
            )
        })?;
        self.ignore_unused(row, ty);

        let rule = match ty {
            ConstraintType::CapacityFloor => {
                let dimension = self.capacity_dimension(&row.dimension)?;
                let key = self.slice_key(dimension, &row.dimension_key)?;
                let min_tokens = self.non_negative("min_tokens", row.min_tokens)?;
                ConstraintRule::CapacityFloor {
                    dimension,
                    key,
                    min_tokens,
                }
            }
            ConstraintType::CapacityCap => {
                let dimension = self.capacity_dimension(&row.dimension)?;
                let key = self.slice_key(dimension, &row.dimension_key)?;
                let max_tokens = self.non_negative("max_tokens", row.max_tokens)?;
                ConstraintRule::CapacityCap {
                    dimension,
                    key,
                    max_tokens,
                }
            }
            ConstraintType::Mandatory => {
                self.expect_dimension(&row.dimension, Dimension::Initiative, ty)?;
                ConstraintRule::Mandatory {
                    id: self.candidate("dimension_key", &row.dimension_key)?,
                }
            }
            ConstraintType::ExcludeInitiative => {
                self.expect_dimension(&row.dimension, Dimension::Initiative, ty)?;
                ConstraintRule::ExcludeInitiative {
                    id: self.candidate("dimension_key", &row.dimension_key)?,
                }
            }
            ConstraintType::BundleAllOrNothing => {
                self.expect_dimension(&row.dimension, Dimension::Bundle, ty)?;
                let bundle_key = self.required("dimension_key", &row.dimension_key)?.to_string();
                let members = self.members("bundle_member_keys", &row.bundle_member_keys)?;
                ConstraintRule::Bundle {
                    bundle_key,
                    members,
                }
            }
            ConstraintType::ExcludePair => {
                self.expect_dimension(&row.dimension, Dimension::Initiative, ty)?;
                let first = self.candidate("dimension_key", &row.dimension_key)?;
                ConstraintRule::ExcludePair {
                    pair: self.pair(first, row.pair_member_key.as_deref())?,
                }
            }
            ConstraintType::SynergyBonus => {
                self.expect_dimension(&row.dimension, Dimension::Initiative, ty)?;
                let first = self.candidate("dimension_key", &row.dimension_key)?;
                ConstraintRule::SynergyBonus {
                    pair: self.pair(first, row.pair_member_key.as_deref())?,
                }
            }
            ConstraintType::RequirePrereq => {
                self.expect_dimension(&row.dimension, Dimension::Initiative, ty)?;
                let dependent = self.candidate("dimension_key", &row.dimension_key)?;
                let required = self.members("prereq_member_keys", &row.prereq_member_keys)?;
                if required.contains(&dependent) {
                    return Err(self.error(
                        ValidationCode::SelfPair,
                        format!("{dependent} cannot be its own prerequisite"),
                    ));
                }
                ConstraintRule::RequirePrereq {
                    dependent,
                    required,
                }
            }
        };
        self.finish(rule)
    }

    fn validate_target(
        self,
        row: &TargetRow,
        valid_kpi_keys: &BTreeSet<KpiKey>,
    ) -> Checked<Validated<TargetRule>> {
        self.required("scenario_name", &row.scenario_name)?;
        self.required("constraint_set_name", &row.constraint_set_name)?;
        let dimension = self.capacity_dimension(&row.dimension)?;
        let key = self.slice_key(dimension, &row.dimension_key)?;

        let kpi_key = KpiKey::new(self.required("kpi_key", &row.kpi_key)?);
        if !valid_kpi_keys.contains(&kpi_key) {
            return Err(self.error(
                ValidationCode::UnknownKpi,
                format!("kpi_key '{kpi_key}' is not a registered KPI"),
            ));
        }

        let literal = self.required("floor_or_goal", &row.floor_or_goal)?;
        let kind = TargetKind::from_str(literal).map_err(|value| {
            self.error(
                ValidationCode::InvalidTargetKind,
                format!("floor_or_goal must be 'floor' or 'goal', got '{value}'"),
            )
        })?;

        let value = self.non_negative("target_value", row.target_value)?;
        let notes = row
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        self.finish(TargetRule {
            dimension,
            key,
            kpi_key,
            kind,
            value,
            notes,
        })
    }
}
