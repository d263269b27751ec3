//! Operator entry point.

use std::path::Path;

use crate::adapter::inbound::cli::paths;
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Operator implementation backed by one loaded [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Operator {
    pub(super) config: Config,
}

impl Operator {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Operator for the config named by `--config`, else
    /// `~/.portfolio-solver/config.toml` when present, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing or a file is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Config::resolve(explicit, &paths::default_config()).map(Self::new)
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
