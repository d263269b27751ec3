//! Handler for the `check` command.

use std::process::ExitCode;

use serde_json::json;

use super::command::ProblemArgs;
use super::output;
use super::prepare;
use crate::application::feasibility::check;
use crate::domain::feasibility::FeasibilityReport;
use crate::domain::problem::OptimizationProblem;
use crate::error::Result;
use crate::port::OperatorPort;

/// Execute `check`. Fails when the report carries errors.
pub async fn execute(args: &ProblemArgs, operator: &dyn OperatorPort) -> Result<ExitCode> {
    let problem = prepare::problem(args, operator).await?;
    let report = check(&problem);

    if output::is_json() {
        output::document(
            "feasibility",
            json!({
                "set": problem.compiled.key,
                "report": report,
            }),
        );
    } else {
        output::header(env!("CARGO_PKG_VERSION"));
        print_report(&problem, &report);
    }

    Ok(if report.is_feasible {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Human rendering of a feasibility report.
pub(super) fn print_report(problem: &OptimizationProblem, report: &FeasibilityReport) {
    output::section("Feasibility");
    output::field("Set", output::highlight(&problem.compiled.key));
    output::field("Objective", problem.objective_mode());
    output::field("Candidates", problem.candidates.len());
    if let Some(capacity) = report.details.global_capacity {
        output::field("Capacity", capacity);
    }
    output::field("Forced", report.details.forced_selection.len());
    output::field("Forced tokens", report.details.forced_tokens);

    if !report.warnings.is_empty() {
        output::section("Warnings");
        for issue in &report.warnings {
            output::warning(&issue.to_string());
        }
    }

    if report.is_feasible {
        output::success("No conflicts found");
        return;
    }

    output::section("Errors");
    for issue in &report.errors {
        output::error(&issue.to_string());
    }
    output::hint("fix the rules named above, then run check again");
}
