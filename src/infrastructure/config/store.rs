//! Constraint set store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::adapter::inbound::cli::paths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one JSON record per compiled constraint set.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: paths::default_store(),
        }
    }
}
