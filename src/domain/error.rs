//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by constructors that validate inputs, such as
//! [`IdPair::new`](super::id::IdPair::new) and
//! [`KpiCatalog::new`](super::kpi::KpiCatalog::new).
//!
//! # Examples
//!
//! ```
//! use portfolio_solver::domain::error::DomainError;
//! use portfolio_solver::domain::id::IdPair;
//!
//! let result = IdPair::new("A".into(), "A".into());
//! assert!(matches!(result, Err(DomainError::SelfPair { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A pair constraint must name two different candidates.
    #[error("pair must name two distinct candidates, got {id} twice")]
    SelfPair {
        /// The repeated identifier.
        id: String,
    },

    /// A dimension literal outside the closed enum.
    #[error("unknown dimension '{value}'")]
    UnknownDimension {
        /// The rejected literal.
        value: String,
    },

    /// A dimension that is valid in general but not for capacity or targets.
    #[error("dimension '{value}' is not a capacity dimension")]
    NotCapacityDimension {
        /// The rejected literal.
        value: String,
    },

    /// The KPI catalog declares more than one North Star.
    #[error("KPI catalog declares more than one North Star: {first} and {second}")]
    MultipleNorthStars {
        /// First North Star encountered.
        first: String,
        /// Second North Star encountered.
        second: String,
    },

    /// A KPI listed twice in the catalog.
    #[error("KPI '{key}' is declared more than once")]
    DuplicateKpi {
        /// The duplicated key.
        key: String,
    },

    /// A `feeds_into` edge points at an undeclared KPI.
    #[error("KPI '{key}' feeds into undeclared KPI '{target}'")]
    UnknownCausalTarget {
        /// The declaring KPI.
        key: String,
        /// The missing target KPI.
        target: String,
    },
}
