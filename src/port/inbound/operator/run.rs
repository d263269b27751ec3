//! Planning run control for operator-facing adapters.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::outcome::RunOutcome;
use crate::domain::problem::OptimizationProblem;
use crate::error::Result;

/// Completes when the operator asks a run to stop.
pub type Interrupt = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Per-run overrides from CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunRequest {
    /// Per-stage solver time limit in seconds.
    pub time_limit_secs: Option<f64>,
}

/// Run use-cases for operator-facing adapters.
#[async_trait]
pub trait RunOperator: Send + Sync {
    /// Check and solve `problem` on the configured backend.
    ///
    /// Fails only when the overrides or backend settings are invalid;
    /// infeasible and failed solves are reported in the outcome.
    async fn run(
        &self,
        problem: OptimizationProblem,
        request: RunRequest,
        interrupt: Interrupt,
    ) -> Result<RunOutcome>;
}
