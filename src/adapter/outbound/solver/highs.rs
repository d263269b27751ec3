//! HiGHS backend via good_lp.
//!
//! HiGHS is a high-performance open-source mixed-integer programming solver.
//! Decimal coefficients are converted to `f64` at this boundary only.

use std::time::{Duration, Instant};

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::model::{
    ConstraintSense, MilpModel, Objective, ObjectiveSense, VarIndex, VariableKind,
};
use crate::error::{Result, SolverError};
use crate::port::{MilpSolver, RawSolverOutput, RawStatus};

/// HiGHS-based MILP solver.
#[derive(Debug, Clone, Default)]
pub struct HighsSolver {
    time_limit: Option<Duration>,
    mip_rel_gap: Option<f64>,
    threads: Option<u32>,
}

impl HighsSolver {
    /// Create a solver with HiGHS defaults.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_mip_rel_gap(mut self, gap: f64) -> Self {
        self.mip_rel_gap = Some(gap);
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }
}

impl MilpSolver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, model: &MilpModel, objective: &Objective) -> Result<RawSolverOutput> {
        let start = Instant::now();
        if model.variables.is_empty() {
            return Ok(RawSolverOutput {
                status: RawStatus::Optimal,
                values: Vec::new(),
                objective: Some(Decimal::ZERO),
                elapsed: start.elapsed(),
                iterations: None,
            });
        }

        let mut vars = variables!();
        let mut var_list: Vec<Variable> = Vec::with_capacity(model.variables.len());
        for var in &model.variables {
            let mut def = match var.kind {
                VariableKind::Binary => variable().binary(),
                VariableKind::Continuous => variable(),
            };
            if let Some(lower) = var.bounds.lower {
                def = def.min(to_f64(lower));
            }
            if let Some(upper) = var.bounds.upper {
                def = def.max(to_f64(upper));
            }
            var_list.push(vars.add(def));
        }

        let goal = expression(&var_list, &objective.terms)?;
        let unsolved = match objective.sense {
            ObjectiveSense::Maximize => vars.maximise(goal),
            ObjectiveSense::Minimize => vars.minimise(goal),
        };

        let mut problem = unsolved.using(highs).set_option("output_flag", false);
        if let Some(limit) = self.time_limit {
            problem = problem.set_option("time_limit", limit.as_secs_f64());
        }
        if let Some(gap) = self.mip_rel_gap {
            problem = problem.set_option("mip_rel_gap", gap);
        }
        if let Some(threads) = self.threads {
            problem = problem.set_option("threads", i32::try_from(threads).unwrap_or(i32::MAX));
        }

        for c in &model.constraints {
            let lhs = expression(&var_list, &c.terms)?;
            let rhs = to_f64(c.rhs);
            problem = match c.sense {
                ConstraintSense::GreaterEqual => problem.with(constraint!(lhs >= rhs)),
                ConstraintSense::LessEqual => problem.with(constraint!(lhs <= rhs)),
                ConstraintSense::Equal => problem.with(constraint!(lhs == rhs)),
            };
        }

        let result = problem.solve();
        let elapsed = start.elapsed();
        let out = match result {
            Ok(solution) => {
                let values: Vec<Decimal> = var_list
                    .iter()
                    .zip(&model.variables)
                    .map(|(v, var)| {
                        let value = Decimal::try_from(solution.value(*v)).unwrap_or(Decimal::ZERO);
                        // Binaries come back within integrality tolerance of 0 or 1.
                        match var.kind {
                            VariableKind::Binary => value.round(),
                            VariableKind::Continuous => value,
                        }
                    })
                    .collect();
                let hit_limit = self.time_limit.is_some_and(|limit| elapsed >= limit);
                RawSolverOutput {
                    status: if hit_limit {
                        RawStatus::LimitReached
                    } else {
                        RawStatus::Optimal
                    },
                    objective: Some(objective.evaluate(&values)),
                    values,
                    elapsed,
                    iterations: None,
                }
            }
            Err(ResolutionError::Infeasible) => {
                RawSolverOutput::without_values(RawStatus::Infeasible, elapsed)
            }
            Err(ResolutionError::Unbounded) => {
                RawSolverOutput::without_values(RawStatus::Unbounded, elapsed)
            }
            Err(e) => RawSolverOutput::without_values(RawStatus::Failed(e.to_string()), elapsed),
        };

        debug!(
            solver = "highs",
            objective = %objective.label,
            variables = var_list.len(),
            constraints = model.constraints.len(),
            status = %out.status,
            elapsed_ms = elapsed.as_millis() as u64,
            "HiGHS solve finished"
        );
        Ok(out)
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn expression(vars: &[Variable], terms: &[(VarIndex, Decimal)]) -> Result<Expression> {
    let parts = terms
        .iter()
        .map(|(index, coef)| {
            vars.get(*index)
                .map(|var| to_f64(*coef) * *var)
                .ok_or(SolverError::UnknownVariable {
                    index: *index,
                    count: vars.len(),
                })
        })
        .collect::<std::result::Result<Vec<Expression>, SolverError>>()?;
    Ok(parts.into_iter().sum())
}
