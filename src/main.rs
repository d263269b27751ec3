use std::process::ExitCode;

use clap::Parser;
use portfolio_solver::adapter::inbound::cli::command::Cli;
use portfolio_solver::adapter::inbound::cli::{dispatch, output};
use portfolio_solver::error::Result;
use portfolio_solver::infrastructure::operator::Operator;
use tracing::error;

fn operator_for(cli: &Cli) -> Result<Operator> {
    if cli.command.reads_settings() {
        Operator::load(cli.command.config_path())
    } else {
        Ok(Operator::default())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::set_color(cli.color.forced());
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let result = match operator_for(&cli) {
        Ok(operator) => dispatch::run(cli, &operator).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
