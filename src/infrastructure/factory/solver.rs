//! Solver factory.
//!
//! Builds the configured MILP backend and the run loop around it.

use std::sync::Arc;

use crate::adapter::outbound::solver::HighsSolver;
use crate::application::runner::PlanRunner;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::Config;
use crate::port::MilpSolver;

/// Build the MILP backend named in `[solver]`.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownBackend`] for a backend this build lacks.
pub fn build_solver(config: &Config) -> Result<Arc<dyn MilpSolver>> {
    match config.solver.backend.as_str() {
        "highs" => {
            let mut solver = HighsSolver::new().with_time_limit(config.time_limit());
            if let Some(gap) = config.solver.mip_rel_gap {
                solver = solver.with_mip_rel_gap(gap);
            }
            if let Some(threads) = config.solver.threads {
                solver = solver.with_threads(threads);
            }
            Ok(Arc::new(solver))
        }
        other => Err(ConfigError::UnknownBackend(other.to_string()).into()),
    }
}

/// Build a runner bounded by `run_timeout_secs`.
///
/// # Errors
///
/// Propagates [`build_solver`] errors.
pub fn build_runner(config: &Config) -> Result<PlanRunner> {
    Ok(PlanRunner::new(build_solver(config)?, config.run_timeout()))
}
