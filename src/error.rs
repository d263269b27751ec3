use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::{CandidateId, KpiKey};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("unknown solver backend '{0}'")]
    UnknownBackend(String),
}

/// Configuration problems in a scenario, candidate pool or KPI setup that
/// prevent building an optimization problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("candidate {id} appears more than once in the pool")]
    DuplicateCandidate { id: CandidateId },

    #[error("candidate {id} has negative token cost {cost}")]
    NegativeTokenCost {
        id: CandidateId,
        cost: rust_decimal::Decimal,
    },

    #[error("scenario '{scenario}' does not match constraint set scenario '{constraint_set}'")]
    ScenarioMismatch {
        scenario: String,
        constraint_set: String,
    },

    #[error("objective mode {mode} requires a North Star KPI, but none is declared")]
    NoNorthStar { mode: String },

    #[error("objective weights are only valid in weighted_kpis mode (mode is {mode})")]
    WeightsNotAllowed { mode: String },

    #[error("weighted_kpis mode requires at least one objective weight")]
    EmptyWeights,

    #[error("objective weight on '{kpi}', which is not a North Star or Strategic KPI")]
    WeightOnIneligibleKpi { kpi: KpiKey },

    #[error("no normalization scale for '{kpi}': set one on the scenario or add a global target")]
    MissingScale { kpi: KpiKey },

    #[error("normalization scale for '{kpi}' must be positive, got {scale}")]
    NonPositiveScale {
        kpi: KpiKey,
        scale: rust_decimal::Decimal,
    },

    #[error("primary KPI '{kpi}' is not a North Star or Strategic KPI")]
    InvalidPrimaryKpi { kpi: KpiKey },

    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange {
        field: &'static str,
        value: rust_decimal::Decimal,
    },
}

/// Solver adapter errors.
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    #[error("solver backend failed: {0}")]
    Backend(String),

    #[error("term references variable {index}, but the model has {count}")]
    UnknownVariable { index: usize, count: usize },
}

/// Constraint set store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store record {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, Error>;
