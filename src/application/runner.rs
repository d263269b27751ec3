//! One planning run: check, solve on a blocking thread, map.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::feasibility::check;
use super::mapper::map_staged;
use super::solve::solve_staged;
use crate::domain::outcome::RunOutcome;
use crate::domain::problem::OptimizationProblem;
use crate::domain::solution::{OptimizationSolution, SolutionStatus, SolverDiagnostics};
use crate::port::MilpSolver;

/// Runs problems against a solver backend.
///
/// Runs share nothing but the solver handle, so any number may proceed
/// concurrently.
#[derive(Clone)]
pub struct PlanRunner {
    solver: Arc<dyn MilpSolver>,
    timeout: Duration,
}

impl PlanRunner {
    pub fn new(solver: Arc<dyn MilpSolver>, timeout: Duration) -> Self {
        Self { solver, timeout }
    }

    #[must_use]
    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    /// Check and, when feasible, solve `problem`.
    pub async fn run(&self, problem: OptimizationProblem) -> RunOutcome {
        self.run_until(problem, std::future::pending::<()>()).await
    }

    /// Like [`run`](Self::run), aborting when `cancel` completes first.
    ///
    /// A cancelled or timed out run reports `solver_error`. The blocking
    /// solve is detached; the backend's own time limit bounds it.
    pub async fn run_until<F>(&self, problem: OptimizationProblem, cancel: F) -> RunOutcome
    where
        F: Future<Output = ()> + Send,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "run",
            %run_id,
            scenario = %problem.scenario.name,
            set = %problem.compiled.key,
        );
        self.execute(problem, cancel).instrument(span).await
    }

    async fn execute<F>(&self, problem: OptimizationProblem, cancel: F) -> RunOutcome
    where
        F: Future<Output = ()> + Send,
    {
        let report = check(&problem);
        if !report.is_feasible {
            info!(errors = report.errors.len(), "run rejected by feasibility check");
            return RunOutcome::Rejected(report);
        }

        let problem = Arc::new(problem);
        let solver = Arc::clone(&self.solver);
        let task_problem = Arc::clone(&problem);
        let started = Instant::now();
        let task = tokio::task::spawn_blocking(move || solve_staged(solver.as_ref(), &task_problem));

        let failure = |message: String| {
            warn!(%message, "run aborted");
            OptimizationSolution::empty(
                SolutionStatus::SolverError,
                SolverDiagnostics {
                    solver: self.solver.name().to_string(),
                    solve_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    message: Some(message),
                    ..SolverDiagnostics::default()
                },
            )
        };

        let solution = tokio::select! {
            joined = tokio::time::timeout(self.timeout, task) => match joined {
                Ok(Ok(Ok(output))) => map_staged(&output, &problem, self.solver.name()),
                Ok(Ok(Err(e))) => failure(format!("solver failed: {e}")),
                Ok(Err(e)) => failure(format!("solver task failed: {e}")),
                Err(_) => failure(format!("solve timed out after {}s", self.timeout.as_secs_f64())),
            },
            () = cancel => failure("run cancelled".to_string()),
        };

        info!(status = %solution.status, "run finished");
        RunOutcome::Solved { report, solution }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::builder::build;
    use crate::domain::candidate::Candidate;
    use crate::domain::compiled::CompiledConstraintSet;
    use crate::domain::feasibility::IssueCode;
    use crate::domain::id::{CandidateId, ConstraintSetKey};
    use crate::domain::kpi::{KpiCatalog, KpiDefinition, KpiLevel};
    use crate::domain::model::{MilpModel, Objective};
    use crate::domain::scenario::Scenario;
    use crate::error::Result;
    use crate::port::{RawSolverOutput, RawStatus};
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Selects every candidate after an optional delay; counts calls.
    struct AllIn {
        delay: Duration,
        calls: Mutex<usize>,
    }

    impl AllIn {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                calls: Mutex::new(0),
            })
        }
    }

    impl MilpSolver for AllIn {
        fn name(&self) -> &'static str {
            "all-in"
        }

        fn solve(&self, model: &MilpModel, _objective: &Objective) -> Result<RawSolverOutput> {
            *self.calls.lock() += 1;
            std::thread::sleep(self.delay);
            Ok(RawSolverOutput {
                status: RawStatus::Optimal,
                values: vec![Decimal::ONE; model.num_variables()],
                objective: None,
                elapsed: self.delay,
                iterations: None,
            })
        }
    }

    fn problem(mandatory: &[&str], excluded: &[&str]) -> OptimizationProblem {
        let catalog = KpiCatalog::new([KpiDefinition::new("revenue", Some(KpiLevel::NorthStar))]).unwrap();
        let mut set = CompiledConstraintSet::new(ConstraintSetKey::new("base", "default"));
        set.mandatory.extend(mandatory.iter().map(|id| CandidateId::from(*id)));
        set.exclusions_initiatives
            .extend(excluded.iter().map(|id| CandidateId::from(*id)));
        let candidates = vec![
            Candidate::new("A", dec!(100)).with_contribution("revenue", dec!(80)),
            Candidate::new("B", dec!(200)).with_contribution("revenue", dec!(50)),
        ];
        build(&Scenario::new("base"), &set, &candidates, &catalog).unwrap()
    }

    #[tokio::test]
    async fn infeasible_problem_never_reaches_the_solver() {
        let solver = AllIn::new(Duration::ZERO);
        let runner = PlanRunner::new(solver.clone(), Duration::from_secs(5));
        let outcome = runner.run(problem(&["A"], &["A"])).await;
        assert!(matches!(outcome, RunOutcome::Rejected(_)));
        assert!(outcome.report().has_error(IssueCode::MandatoryExcluded));
        assert_eq!(*solver.calls.lock(), 0);
    }

    #[tokio::test]
    async fn feasible_problem_is_solved_and_mapped() {
        let solver = AllIn::new(Duration::ZERO);
        let runner = PlanRunner::new(solver.clone(), Duration::from_secs(5));
        let outcome = runner.run(problem(&[], &[])).await;
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.tokens_used, dec!(300));
        assert_eq!(solution.diagnostics.solver, "all-in");
        assert_eq!(solution.diagnostics.stages.len(), 3);
        assert_eq!(*solver.calls.lock(), 3);
    }

    #[tokio::test]
    async fn slow_solver_times_out() {
        let runner = PlanRunner::new(AllIn::new(Duration::from_millis(200)), Duration::from_millis(20));
        let outcome = runner.run(problem(&[], &[])).await;
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.status, SolutionStatus::SolverError);
        assert!(solution.diagnostics.message.as_deref().unwrap().contains("timed out"));
        assert!(solution.diagnostics.solve_time_ms >= 20);
    }

    #[tokio::test]
    async fn cancellation_aborts_the_run() {
        let runner = PlanRunner::new(AllIn::new(Duration::from_millis(200)), Duration::from_secs(5));
        let outcome = runner.run_until(problem(&[], &[]), async {}).await;
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.status, SolutionStatus::SolverError);
        assert_eq!(solution.diagnostics.message.as_deref(), Some("run cancelled"));
        assert!(solution.diagnostics.solve_time_ms < 5000, "{}", solution.diagnostics.solve_time_ms);
    }
}
