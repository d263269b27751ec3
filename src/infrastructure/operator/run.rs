//! Run operator implementation.

use async_trait::async_trait;

use crate::domain::outcome::RunOutcome;
use crate::domain::problem::OptimizationProblem;
use crate::error::Result;
use crate::infrastructure::factory::build_runner;
use crate::port::inbound::operator::run::{Interrupt, RunOperator, RunRequest};

use super::entry::Operator;

#[async_trait]
impl RunOperator for Operator {
    async fn run(
        &self,
        problem: OptimizationProblem,
        request: RunRequest,
        interrupt: Interrupt,
    ) -> Result<RunOutcome> {
        let mut config = self.config.clone();
        if let Some(limit) = request.time_limit_secs {
            config.solver.time_limit_secs = limit;
            config.validate()?;
        }
        let runner = build_runner(&config)?;
        Ok(runner.run_until(problem, interrupt).await)
    }
}
