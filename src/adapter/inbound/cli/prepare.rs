//! Shared problem assembly for `check` and `solve`.

use tracing::debug;

use super::command::ProblemArgs;
use super::input::PlanningInput;
use super::output;
use crate::application::builder::build;
use crate::application::compile::compile;
use crate::domain::compiled::CompiledConstraintSet;
use crate::domain::id::ConstraintSetKey;
use crate::domain::problem::OptimizationProblem;
use crate::error::{Error, Result};
use crate::port::{KpiRegistry, OperatorPort};

/// Resolve the constraint set named by `args` and build its problem.
///
/// # Errors
///
/// Returns an error for unreadable input, rows that fail validation, a set
/// missing from the store, or a scenario the builder rejects.
pub async fn problem(args: &ProblemArgs, operator: &dyn OperatorPort) -> Result<OptimizationProblem> {
    let input = PlanningInput::load(&args.input)?;
    let catalog = input.kpi_catalog(|| operator.kpi_catalog())?;
    let scenario = input.scenario(&args.scenario)?;
    let key = ConstraintSetKey::new(&args.scenario, &args.constraint_set);

    let set = if args.from_store {
        let store = args.store.as_deref();
        operator.stored_set(store, &key).await?.ok_or_else(|| {
            Error::Input(format!(
                "constraint set {key} not found in {}",
                operator.store_location(store).display()
            ))
        })?
    } else {
        let compilation = compile(&input.constraints, &input.targets, &catalog.valid_kpi_keys());
        if compilation.has_errors() {
            for message in compilation.errors() {
                output::error(&message.to_string());
            }
            return Err(Error::Input(format!(
                "{} row(s) failed validation",
                compilation.errors().count()
            )));
        }
        match compilation.sets.get(&key) {
            Some(set) => set.clone(),
            None => {
                output::warning(&format!("no rows for {key}; using an empty constraint set"));
                CompiledConstraintSet::new(key)
            }
        }
    };

    debug!(set = %set.key, rules = set.rule_count(), "constraint set resolved");
    Ok(build(scenario, &set, &input.candidates, &catalog)?)
}
