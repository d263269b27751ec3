//! Configuration operator implementation.

use std::path::Path;

use crate::domain::kpi::KpiCatalog;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::inbound::operator::configuration::{
    ConfigLogging, ConfigSolver, ConfigStore, ConfigValidationReport, ConfigView,
    ConfigurationOperator,
};

use super::entry::Operator;

impl ConfigurationOperator for Operator {
    fn init_logging(&self, verbose: u8, quiet: bool) {
        self.config.logging.with_verbosity(verbose, quiet).init();
    }

    fn kpi_catalog(&self) -> Result<KpiCatalog> {
        self.config.kpi_catalog()
    }

    fn show_config(&self, path: &Path) -> Result<ConfigView> {
        let config = Config::load(path)?;
        Ok(ConfigView {
            solver: ConfigSolver {
                backend: config.solver.backend,
                time_limit_secs: config.solver.time_limit_secs,
                run_timeout_secs: config.solver.run_timeout_secs,
                mip_rel_gap: config.solver.mip_rel_gap,
                threads: config.solver.threads,
            },
            store: ConfigStore {
                path: config.store.path,
            },
            logging: ConfigLogging {
                level: config.logging.level,
                format: config.logging.format,
            },
            kpis: config.kpis,
        })
    }

    fn validate_config(&self, path: &Path) -> Result<ConfigValidationReport> {
        let config = Config::load(path)?;
        let catalog = config.kpi_catalog()?;
        let mut warnings = Vec::new();
        if catalog.is_empty() {
            warnings.push("no KPIs declared; target rows will be rejected".to_string());
        } else if catalog.north_star_key().is_none() {
            warnings.push("no North Star KPI; north_star scenarios cannot be built".to_string());
        }
        Ok(ConfigValidationReport {
            kpis: config.kpis.len(),
            warnings,
        })
    }
}
