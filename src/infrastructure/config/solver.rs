//! Solver backend configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Backends this build can drive.
pub const KNOWN_BACKENDS: &[&str] = &["highs"];

/// Settings passed to the MILP backend and the run loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Backend name; only `highs` is built in.
    pub backend: String,
    /// Per-stage time limit handed to the backend.
    pub time_limit_secs: f64,
    /// Relative MIP gap at which the backend may stop.
    pub mip_rel_gap: Option<f64>,
    /// Backend worker threads; `None` lets the backend decide.
    pub threads: Option<u32>,
    /// Wall-clock bound on a whole run, across all stages.
    pub run_timeout_secs: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: "highs".into(),
            time_limit_secs: 60.0,
            mip_rel_gap: None,
            threads: None,
            run_timeout_secs: 300.0,
        }
    }
}

impl SolverConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if !KNOWN_BACKENDS.contains(&self.backend.as_str()) {
            return Err(ConfigError::UnknownBackend(self.backend.clone()).into());
        }
        if self.time_limit_secs <= 0.0 || !self.time_limit_secs.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "time_limit_secs",
                reason: "must be a positive number of seconds".to_string(),
            }
            .into());
        }
        if self.run_timeout_secs <= 0.0 || !self.run_timeout_secs.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "run_timeout_secs",
                reason: "must be a positive number of seconds".to_string(),
            }
            .into());
        }
        if let Some(gap) = self.mip_rel_gap {
            if !(0.0..=1.0).contains(&gap) {
                return Err(ConfigError::InvalidValue {
                    field: "mip_rel_gap",
                    reason: "must be between 0 and 1".to_string(),
                }
                .into());
            }
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "threads",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
