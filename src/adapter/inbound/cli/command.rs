//! Command-line interface definitions.
//!
//! `compile` turns authored rows into stored constraint sets, `check` runs
//! the pre-solve feasibility analysis for one scenario and set, and `solve`
//! goes on to optimize and print the selection.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use super::paths;

/// Portfolio selection under planning constraints
#[derive(Parser, Debug)]
#[command(name = "portfolio-solver")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Forced color setting, `None` for terminal detection.
    #[must_use]
    pub const fn forced(&self) -> Option<bool> {
        match self {
            Self::Auto => None,
            Self::Always => Some(true),
            Self::Never => Some(false),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate and compile constraint and target rows into stored sets
    Compile(CompileArgs),

    /// Run the pre-solve feasibility check for one scenario and set
    Check(ProblemArgs),

    /// Check, solve and report the selected portfolio
    Solve(SolveArgs),

    /// List stored constraint sets
    Sets(SetsArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Commands {
    /// Config file named with `--config`, if any.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Self::Compile(args) => args.config.config.as_deref(),
            Self::Check(args) => args.config.config.as_deref(),
            Self::Solve(args) => args.problem.config.config.as_deref(),
            Self::Sets(args) => args.config.config.as_deref(),
            Self::Config(_) => None,
        }
    }

    /// Whether the command runs against the active settings. `config`
    /// subcommands name their file explicitly and must work when the
    /// default file is broken.
    #[must_use]
    pub fn reads_settings(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

/// Optional config file; without it the default path is used when present.
#[derive(Parser, Debug, Default)]
pub struct ConfigOverride {
    /// Configuration file [default: ~/.portfolio-solver/config.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for `portfolio-solver compile`.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Planning input document (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Store directory, overriding `[store] path`
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Validate and compile without writing to the store
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub config: ConfigOverride,
}

/// Arguments selecting one scenario and constraint set.
#[derive(Parser, Debug)]
pub struct ProblemArgs {
    /// Planning input document (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Scenario name
    #[arg(short, long)]
    pub scenario: String,

    /// Constraint set name
    #[arg(long = "set", default_value = "default")]
    pub constraint_set: String,

    /// Read the compiled set from the store instead of compiling the input rows
    #[arg(long)]
    pub from_store: bool,

    /// Store directory, overriding `[store] path`
    #[arg(long)]
    pub store: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigOverride,
}

/// Arguments for `portfolio-solver solve`.
#[derive(Parser, Debug)]
pub struct SolveArgs {
    #[command(flatten)]
    pub problem: ProblemArgs,

    /// Per-stage solver time limit in seconds, overriding `[solver]`
    #[arg(long)]
    pub time_limit: Option<f64>,
}

/// Arguments for `portfolio-solver sets`.
#[derive(Parser, Debug)]
pub struct SetsArgs {
    /// Store directory, overriding `[store] path`
    #[arg(long)]
    pub store: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigOverride,
}

/// Subcommands for `portfolio-solver config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Arguments for `config init`.
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Path to write the configuration file
    #[arg(default_value_os_t = paths::default_config())]
    pub path: PathBuf,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Shared config path argument.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}
