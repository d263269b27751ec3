//! Configuration projections for operator-facing adapters.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::kpi::{KpiCatalog, KpiDefinition};
use crate::error::Result;

/// Solver section of a configuration view.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSolver {
    pub backend: String,
    pub time_limit_secs: f64,
    pub run_timeout_secs: f64,
    pub mip_rel_gap: Option<f64>,
    pub threads: Option<u32>,
}

/// Store section of a configuration view.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigStore {
    pub path: PathBuf,
}

/// Logging section of a configuration view.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigLogging {
    pub level: String,
    pub format: String,
}

/// Full configuration projection for `config show`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    pub solver: ConfigSolver,
    pub store: ConfigStore,
    pub logging: ConfigLogging,
    pub kpis: Vec<KpiDefinition>,
}

/// Validation output for `config validate`.
#[derive(Debug, Clone, Default)]
pub struct ConfigValidationReport {
    pub kpis: usize,
    pub warnings: Vec<String>,
}

/// Configuration use-cases for operator-facing adapters.
pub trait ConfigurationOperator: Send + Sync {
    /// Install the global subscriber from the active settings, adjusted by
    /// `-v` and `-q`.
    fn init_logging(&self, verbose: u8, quiet: bool);

    /// KPI catalog declared by the active settings.
    fn kpi_catalog(&self) -> Result<KpiCatalog>;

    /// Build a projection of the config file at `path`.
    fn show_config(&self, path: &Path) -> Result<ConfigView>;

    /// Validate the config file at `path` and return non-fatal warnings.
    fn validate_config(&self, path: &Path) -> Result<ConfigValidationReport>;
}
