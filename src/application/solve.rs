//! Staged (lexicographic) solve over a [`MilpSolver`].

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::problem::OptimizationProblem;
use crate::domain::solution::StageReport;
use crate::error::Result;
use crate::port::{MilpSolver, RawSolverOutput, RawStatus};

/// Final assignment plus the per-stage trail.
#[derive(Debug, Clone)]
pub struct StagedOutput {
    /// Values of the last stage that produced an assignment, with the
    /// worst status seen and the summed solve time.
    pub raw: RawSolverOutput,
    pub stages: Vec<StageReport>,
}

/// Absolute tolerance when pinning an optimal stage value. Later stages may
/// only choose among assignments that match the pinned value up to solver
/// precision, whatever its magnitude.
const RETENTION_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Solve the problem's objective stages in order.
///
/// Each optimal stage is pinned as a constraint before the next one runs.
/// The sequence stops at the first stage that is not proven optimal. A later
/// stage that yields no assignment falls back to the previous assignment,
/// reported as [`RawStatus::LimitReached`].
///
/// # Errors
///
/// Propagates backend errors from [`MilpSolver::solve`].
pub fn solve_staged(solver: &dyn MilpSolver, problem: &OptimizationProblem) -> Result<StagedOutput> {
    let mut model = problem.model.clone();
    let mut stages = Vec::with_capacity(problem.stages.len());
    let mut elapsed = Duration::ZERO;
    let mut iterations: Option<u64> = None;
    let mut best: Option<RawSolverOutput> = None;
    let mut status = RawStatus::Optimal;

    for objective in &problem.stages {
        let out = solver.solve(&model, objective)?;
        elapsed += out.elapsed;
        if let Some(n) = out.iterations {
            iterations = Some(iterations.unwrap_or(0) + n);
        }
        debug!(
            solver = solver.name(),
            stage = %objective.label,
            status = %out.status,
            objective = ?out.objective,
            "stage solved"
        );
        stages.push(StageReport {
            label: objective.label.clone(),
            status: out.status.to_string(),
            objective: out.objective,
        });

        if !out.status.has_values() {
            if best.is_some() {
                warn!(stage = %objective.label, status = %out.status, "stage failed, keeping previous assignment");
                status = RawStatus::LimitReached;
            } else {
                status = out.status.clone();
            }
            break;
        }

        let value = objective.evaluate(&out.values);
        let optimal = out.status == RawStatus::Optimal;
        if !optimal {
            status = out.status.clone();
        }
        best = Some(out);
        if !optimal {
            break;
        }
        model.add_constraint(objective.retain(value, RETENTION_EPSILON));
    }

    let raw = match best {
        Some(mut out) => {
            out.status = status;
            out.elapsed = elapsed;
            out.iterations = iterations;
            out
        }
        None => {
            let mut out = RawSolverOutput::without_values(status, elapsed);
            out.iterations = iterations;
            out
        }
    };
    Ok(StagedOutput { raw, stages })
}
