//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::domain::kpi::KpiLevel;
use crate::error::{ConfigError, Result};
use crate::port::OperatorPort;

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Declare your KPIs in {}", path.display()));
    output::note(&format!(
        "2. Run: portfolio-solver config validate -c {}",
        path.display()
    ));
    output::note("3. Run: portfolio-solver compile --input plan.json");
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(operator: &dyn OperatorPort, path: &Path) -> Result<()> {
    let config = operator.show_config(path)?;

    if output::is_json() {
        output::document("config", serde_json::to_value(&config)?);
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Path", path.display());

    output::section("Solver");
    output::field("Backend", &config.solver.backend);
    output::field("Stage limit", format!("{}s", config.solver.time_limit_secs));
    output::field("Run timeout", format!("{}s", config.solver.run_timeout_secs));
    output::field(
        "MIP gap",
        config
            .solver
            .mip_rel_gap
            .map_or_else(|| "backend default".to_string(), |gap| gap.to_string()),
    );
    output::field(
        "Threads",
        config
            .solver
            .threads
            .map_or_else(|| "backend default".to_string(), |n| n.to_string()),
    );

    output::section("Store");
    output::field("Path", config.store.path.display());

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);

    output::section("KPIs");
    if config.kpis.is_empty() {
        output::note("(none declared)");
    }
    for kpi in &config.kpis {
        let level = kpi.level.map_or("supporting", |level| match level {
            KpiLevel::NorthStar => "north star",
            KpiLevel::Strategic => "strategic",
        });
        output::field(kpi.key.as_str(), level);
    }

    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(operator: &dyn OperatorPort, path: &Path) -> Result<()> {
    let report = operator.validate_config(path)?;

    if output::is_json() {
        output::document(
            "config_validation",
            json!({
                "path": path.display().to_string(),
                "valid": true,
                "kpis": report.kpis,
                "warnings": report.warnings,
            }),
        );
        return Ok(());
    }

    output::section("Config Validation");
    output::field("Path", path.display());
    output::success("Config file is valid");
    for warning in &report.warnings {
        output::warning(warning);
    }
    output::field(
        "Next",
        format!("portfolio-solver config show -c {}", path.display()),
    );
    Ok(())
}
