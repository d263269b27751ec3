//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. The
//! file is TOML; every section is optional and falls back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use portfolio_solver::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     let catalog = config.kpi_catalog()?;
//!     assert!(!catalog.is_empty());
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::solver::SolverConfig;
use super::store::StoreConfig;
use crate::domain::kpi::{KpiCatalog, KpiDefinition};
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// MILP backend and run limits.
    #[serde(default)]
    pub solver: SolverConfig,

    /// Where compiled constraint sets are persisted.
    #[serde(default)]
    pub store: StoreConfig,

    /// KPI registry: keys, tiers and causal edges.
    ///
    /// Target rows may only reference keys declared here.
    #[serde(default)]
    pub kpis: Vec<KpiDefinition>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `explicit` if given, else `default` when that file exists, else
    /// built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing or a file is invalid.
    pub fn resolve(explicit: Option<&Path>, default: &Path) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::InvalidValue {
                field: "config",
                reason: format!("file not found: {}", path.display()),
            }
            .into()),
            Some(path) => Self::load(path),
            None if default.exists() => Self::load(default),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected 'pretty' or 'json', got '{}'", self.logging.format),
            }
            .into());
        }
        self.solver.validate()?;
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "store.path" }.into());
        }
        self.kpi_catalog()?;
        Ok(())
    }

    /// Validated KPI catalog from the `kpis` table.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate keys, a second North Star, or a causal
    /// edge to an undeclared KPI.
    pub fn kpi_catalog(&self) -> Result<KpiCatalog> {
        Ok(KpiCatalog::new(self.kpis.iter().cloned())?)
    }

    /// Per-stage solver time limit.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.solver.time_limit_secs)
    }

    /// Wall-clock bound on a whole run.
    #[must_use]
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.solver.run_timeout_secs)
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Serialize back to TOML, as shown by `config show`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
