//! Exhaustive reference solver for small all-binary models.

use std::time::Instant;

use portfolio_solver::domain::model::{MilpModel, Objective, ObjectiveSense, VariableKind};
use portfolio_solver::error::Result;
use portfolio_solver::port::{MilpSolver, RawSolverOutput, RawStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const MAX_VARIABLES: usize = 16;

/// Enumerates every 0/1 assignment and keeps the best feasible one.
/// Ties keep the assignment enumerated first.
pub struct BruteForce;

impl MilpSolver for BruteForce {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn solve(&self, model: &MilpModel, objective: &Objective) -> Result<RawSolverOutput> {
        let start = Instant::now();
        let n = model.num_variables();
        if n > MAX_VARIABLES || model.variables.iter().any(|v| v.kind != VariableKind::Binary) {
            return Ok(RawSolverOutput::without_values(
                RawStatus::Failed("brute force only handles small binary models".into()),
                start.elapsed(),
            ));
        }

        let mut best: Option<(Decimal, Vec<Decimal>)> = None;
        for mask in 0u32..(1u32 << n) {
            let values: Vec<Decimal> = (0..n)
                .map(|i| if mask & (1 << i) != 0 { Decimal::ONE } else { Decimal::ZERO })
                .collect();
            if model.first_violation(&values, dec!(0.000001)).is_some() {
                continue;
            }
            let score = objective.evaluate(&values);
            let better = match &best {
                None => true,
                Some((current, _)) => match objective.sense {
                    ObjectiveSense::Maximize => score > *current,
                    ObjectiveSense::Minimize => score < *current,
                },
            };
            if better {
                best = Some((score, values));
            }
        }

        Ok(match best {
            Some((score, values)) => RawSolverOutput {
                status: RawStatus::Optimal,
                values,
                objective: Some(score),
                elapsed: start.elapsed(),
                iterations: Some(1 << n),
            },
            None => RawSolverOutput::without_values(RawStatus::Infeasible, start.elapsed()),
        })
    }
}
