//! Command dispatch.

use std::process::ExitCode;

use super::command::{Cli, Commands, ConfigCommand};
use super::{check, compile, config, sets, solve};
use crate::error::Result;
use crate::port::OperatorPort;

/// Run a parsed command line against `operator`.
///
/// Logging is initialized here, from the operator's settings, with
/// `-v`/`-q` applied on top.
///
/// # Errors
///
/// Returns configuration, input and store errors; infeasible or failed runs
/// are reported through the exit code instead.
pub async fn run(cli: Cli, operator: &dyn OperatorPort) -> Result<ExitCode> {
    operator.init_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Commands::Compile(args) => compile::execute(args, operator).await,
        Commands::Check(args) => check::execute(args, operator).await,
        Commands::Solve(args) => solve::execute(args, operator).await,
        Commands::Sets(args) => {
            sets::execute(args, operator).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(ConfigCommand::Init(args)) => {
            config::execute_init(&args.path, args.force)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(ConfigCommand::Show(args)) => {
            config::execute_show(operator, &args.config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(ConfigCommand::Validate(args)) => {
            config::execute_validate(operator, &args.config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
