//! Handler for the `compile` command.

use std::process::ExitCode;

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::CompileArgs;
use super::input::PlanningInput;
use super::output;
use crate::application::compile::{compile, Compilation};
use crate::domain::compiled::CompiledConstraintSet;
use crate::error::Result;
use crate::port::{KpiRegistry, OperatorPort};

#[derive(Tabled)]
struct SetRow {
    #[tabled(rename = "Scenario")]
    scenario: String,
    #[tabled(rename = "Set")]
    set: String,
    #[tabled(rename = "Rules")]
    rules: usize,
    #[tabled(rename = "Targets")]
    targets: usize,
}

impl From<&CompiledConstraintSet> for SetRow {
    fn from(set: &CompiledConstraintSet) -> Self {
        Self {
            scenario: set.key.scenario_name.clone(),
            set: set.key.constraint_set_name.clone(),
            rules: set.rule_count(),
            targets: set.iter_targets().count(),
        }
    }
}

/// Execute `compile`.
///
/// Validation errors fail the command and nothing is stored.
pub async fn execute(args: &CompileArgs, operator: &dyn OperatorPort) -> Result<ExitCode> {
    let input = PlanningInput::load(&args.input)?;
    let catalog = input.kpi_catalog(|| operator.kpi_catalog())?;
    let compilation = compile(&input.constraints, &input.targets, &catalog.valid_kpi_keys());

    let store = args.store.as_deref();
    let location = operator.store_location(store);
    let persist = !args.dry_run && !compilation.has_errors();
    if persist {
        let sets: Vec<CompiledConstraintSet> = compilation.sets.values().cloned().collect();
        operator.store_sets(store, &sets).await?;
    }

    if output::is_json() {
        output::document(
            "compilation",
            json!({
                "input": args.input.display().to_string(),
                "sets": compilation.sets.values().collect::<Vec<_>>(),
                "messages": compilation.messages,
                "stored": persist,
                "store": location.display().to_string(),
            }),
        );
    } else {
        print_compilation(&compilation, &args.input.display().to_string());
        if persist {
            output::success(&format!(
                "Stored {} constraint set(s) in {}",
                compilation.sets.len(),
                location.display()
            ));
        } else if args.dry_run && !compilation.has_errors() {
            output::note("Dry run: nothing stored");
        }
    }

    if compilation.has_errors() {
        output::error(&format!(
            "{} row(s) failed validation; nothing stored",
            compilation.errors().count()
        ));
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_compilation(compilation: &Compilation, input: &str) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Compilation");
    output::field("Input", input);
    output::field("Sets", compilation.sets.len());
    output::field("Errors", compilation.errors().count());
    output::field("Warnings", compilation.warnings().count());

    if !compilation.sets.is_empty() {
        let rows: Vec<SetRow> = compilation.sets.values().map(SetRow::from).collect();
        output::section("Constraint sets");
        output::lines(&Table::new(rows).to_string());
    }

    if !compilation.messages.is_empty() {
        output::section("Messages");
        for message in compilation.warnings() {
            output::warning(&message.to_string());
        }
        for message in compilation.errors() {
            output::error(&message.to_string());
        }
    }
}
