//! Handler for the `sets` command.

use serde_json::json;

use super::command::SetsArgs;
use super::output;
use crate::error::Result;
use crate::port::OperatorPort;

/// Execute `sets`: list stored constraint set keys.
pub async fn execute(args: &SetsArgs, operator: &dyn OperatorPort) -> Result<()> {
    let store = args.store.as_deref();
    let location = operator.store_location(store);
    let keys = operator.stored_keys(store).await?;

    if output::is_json() {
        output::document(
            "sets",
            json!({
                "store": location.display().to_string(),
                "sets": keys,
            }),
        );
        return Ok(());
    }

    output::section("Stored constraint sets");
    output::field("Store", location.display());
    if keys.is_empty() {
        output::note("(none)");
        output::hint("run `portfolio-solver compile --input <file>` to add sets");
    }
    for key in &keys {
        output::note(&format!("- {key}"));
    }
    Ok(())
}
