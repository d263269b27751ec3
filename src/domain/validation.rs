//! Per-row validation messages.
//!
//! Row problems are data, not `Err` values: the compiler collects every
//! message and keeps going with the remaining rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::row::RowIdentity;

/// Whether a message blocks the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The row is dropped from compilation.
    Error,
    /// The row compiles; something about it deserves attention.
    Warning,
}

/// Machine-readable reason attached to a [`ValidationMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationCode {
    MissingField { field: String },
    UnknownConstraintType,
    UnknownDimension,
    DimensionNotAllowed,
    DimensionKeyNotAllowed,
    NegativeValue { field: String },
    UnknownKpi,
    InvalidTargetKind,
    SelfPair,
    IgnoredField { field: String },
    DuplicateMember,
    ConflictingDuplicate,
}

impl ValidationCode {
    /// Short literal for reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::UnknownConstraintType => "unknown_constraint_type",
            Self::UnknownDimension => "unknown_dimension",
            Self::DimensionNotAllowed => "dimension_not_allowed",
            Self::DimensionKeyNotAllowed => "dimension_key_not_allowed",
            Self::NegativeValue { .. } => "negative_value",
            Self::UnknownKpi => "unknown_kpi",
            Self::InvalidTargetKind => "invalid_target_kind",
            Self::SelfPair => "self_pair",
            Self::IgnoredField { .. } => "ignored_field",
            Self::DuplicateMember => "duplicate_member",
            Self::ConflictingDuplicate => "conflicting_duplicate",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem found with one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub identity: RowIdentity,
    pub severity: Severity,
    #[serde(flatten)]
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationMessage {
    /// Build a blocking message.
    pub fn error(identity: RowIdentity, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            identity,
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    /// Build a non-blocking message.
    pub fn warning(identity: RowIdentity, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            identity,
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}[{}] {}: {}", self.code, self.identity, self.message)
    }
}

/// A successfully validated rule with any soft warnings raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub rule: T,
    pub warnings: Vec<ValidationMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> RowIdentity {
        RowIdentity {
            row_number: 3,
            scenario_name: "base".into(),
            constraint_set_name: "default".into(),
            dimension: "country".into(),
            dimension_key: "UK".into(),
            kpi_key: None,
        }
    }

    #[test]
    fn display_names_row_and_code() {
        let msg = ValidationMessage::error(
            identity(),
            ValidationCode::MissingField {
                field: "min_tokens".into(),
            },
            "min_tokens is required",
        );
        assert_eq!(
            msg.to_string(),
            "error[missing_field] row 3 (base/default, country=UK): min_tokens is required"
        );
        assert!(msg.is_error());
    }

    #[test]
    fn serializes_code_flat() {
        let msg = ValidationMessage::warning(identity(), ValidationCode::DuplicateMember, "dup");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["code"], "duplicate_member");
        assert_eq!(json["severity"], "warning");
    }
}
