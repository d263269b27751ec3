//! Constraint set storage for operator-facing adapters.
//!
//! Every method takes the `--store` override; `None` selects the configured
//! location.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::compiled::CompiledConstraintSet;
use crate::domain::id::ConstraintSetKey;
use crate::error::Result;

/// Store use-cases for operator-facing adapters.
#[async_trait]
pub trait StoreOperator: Send + Sync {
    /// Directory the store reads and writes.
    fn store_location(&self, store: Option<&Path>) -> PathBuf;

    /// Persist compiled sets, replacing any stored under the same keys.
    async fn store_sets(&self, store: Option<&Path>, sets: &[CompiledConstraintSet]) -> Result<()>;

    /// Stored set for `key`, if any.
    async fn stored_set(
        &self,
        store: Option<&Path>,
        key: &ConstraintSetKey,
    ) -> Result<Option<CompiledConstraintSet>>;

    /// Every stored key, sorted.
    async fn stored_keys(&self, store: Option<&Path>) -> Result<Vec<ConstraintSetKey>>;
}
