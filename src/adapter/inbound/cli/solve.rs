//! Handler for the `solve` command.

use std::process::ExitCode;

use serde_json::json;
use tabled::{Table, Tabled};

use super::check::print_report;
use super::command::SolveArgs;
use super::output;
use super::prepare;
use crate::domain::outcome::RunOutcome;
use crate::domain::problem::OptimizationProblem;
use crate::domain::solution::OptimizationSolution;
use crate::error::Result;
use crate::port::{Interrupt, OperatorPort, RunRequest};

#[derive(Tabled)]
struct SelectionRow {
    #[tabled(rename = "Candidate")]
    id: String,
    #[tabled(rename = "Tokens")]
    tokens: String,
}

#[derive(Tabled)]
struct GapRow {
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Achieved")]
    achieved: String,
    #[tabled(rename = "Gap")]
    gap: String,
}

/// Execute `solve`.
///
/// Succeeds when the run produced a selection. Ctrl-C cancels the run.
pub async fn execute(args: &SolveArgs, operator: &dyn OperatorPort) -> Result<ExitCode> {
    let problem = prepare::problem(&args.problem, operator).await?;

    let interrupt: Interrupt = Box::pin(async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    });
    let request = RunRequest {
        time_limit_secs: args.time_limit,
    };
    let outcome = operator.run(problem.clone(), request, interrupt).await?;

    if output::is_json() {
        output::document(
            "solution",
            json!({
                "set": problem.compiled.key,
                "report": outcome.report(),
                "solution": outcome.solution(),
            }),
        );
    } else {
        output::header(env!("CARGO_PKG_VERSION"));
        match &outcome {
            RunOutcome::Rejected(report) => print_report(&problem, report),
            RunOutcome::Solved { report, solution } => {
                for issue in &report.warnings {
                    output::warning(&issue.to_string());
                }
                print_solution(&problem, solution);
            }
        }
    }

    let solved = outcome
        .solution()
        .is_some_and(|solution| solution.status.has_selection());
    if !solved {
        let status = outcome
            .solution()
            .map_or_else(
                || "rejected by feasibility check".to_string(),
                |solution| solution.status.to_string(),
            );
        output::error(&format!("no selection produced ({status})"));
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_solution(problem: &OptimizationProblem, solution: &OptimizationSolution) {
    let diagnostics = &solution.diagnostics;
    output::section("Solution");
    output::field("Set", output::highlight(&problem.compiled.key));
    output::field("Status", solution.status);
    output::field("Solver", &diagnostics.solver);
    output::field("Time", format!("{}ms", diagnostics.solve_time_ms));
    if let Some(value) = solution.objective_value {
        let label = problem
            .primary_kpi
            .as_ref()
            .map_or_else(|| "Objective".to_string(), |kpi| format!("Objective ({kpi})"));
        output::field(&label, value.normalize());
    }
    let capacity = problem
        .global_capacity
        .map_or_else(|| "unbounded".to_string(), |c| c.normalize().to_string());
    output::field(
        "Tokens",
        format!("{} / {capacity}", solution.tokens_used.normalize()),
    );

    if let Some(message) = &diagnostics.message {
        output::warning(message);
    }
    if let Some(error) = &diagnostics.consistency_error {
        output::error(error);
    }

    if !diagnostics.stages.is_empty() {
        output::section("Stages");
        for stage in &diagnostics.stages {
            let value = stage
                .objective
                .map_or_else(String::new, |v| format!(" {}", v.normalize()));
            output::field(&stage.label, format!("{}{value}", stage.status));
        }
    }

    if !solution.selected.is_empty() {
        let rows: Vec<SelectionRow> = solution
            .allocations
            .iter()
            .map(|(id, tokens)| SelectionRow {
                id: id.to_string(),
                tokens: tokens.normalize().to_string(),
            })
            .collect();
        output::section(&format!("Selected ({})", rows.len()));
        output::lines(&Table::new(rows).to_string());
    } else if solution.status.has_selection() {
        output::note("No candidates selected");
    }

    if !solution.gaps.is_empty() {
        let rows: Vec<GapRow> = solution
            .gaps
            .iter()
            .map(|gap| GapRow {
                target: format!(
                    "{}:{}",
                    gap.dimension.slice_label(&gap.dimension_key),
                    gap.kpi_key
                ),
                kind: gap.kind.to_string(),
                value: gap.target.normalize().to_string(),
                achieved: gap.achieved.normalize().to_string(),
                gap: gap.gap.normalize().to_string(),
            })
            .collect();
        output::section("Targets");
        output::lines(&Table::new(rows).to_string());
    }
}
