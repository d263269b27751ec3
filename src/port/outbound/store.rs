//! Persistence port for compiled constraint sets.
//!
//! The store is owned by whatever orchestrates authoring saves. Writes are a
//! full replace per key and the last writer wins; there is no versioning.

use std::future::Future;

use crate::domain::compiled::CompiledConstraintSet;
use crate::domain::id::ConstraintSetKey;
use crate::error::Result;

/// Storage operations for compiled constraint sets.
pub trait ConstraintSetStore: Send + Sync {
    /// Replace the set stored under `set.key`.
    fn replace(&self, set: &CompiledConstraintSet) -> impl Future<Output = Result<()>> + Send;

    /// Replace every set in one call, typically after a full recompile.
    fn replace_all(
        &self,
        sets: &[CompiledConstraintSet],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Get the current set for a key.
    fn get(
        &self,
        key: &ConstraintSetKey,
    ) -> impl Future<Output = Result<Option<CompiledConstraintSet>>> + Send;

    /// List stored keys in order.
    fn keys(&self) -> impl Future<Output = Result<Vec<ConstraintSetKey>>> + Send;
}
