//! In-memory constraint set store.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::domain::compiled::CompiledConstraintSet;
use crate::domain::id::ConstraintSetKey;
use crate::error::Result;
use crate::port::ConstraintSetStore;

/// Process-local store, used by tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sets: RwLock<BTreeMap<ConstraintSetKey, CompiledConstraintSet>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }
}

impl ConstraintSetStore for InMemoryStore {
    async fn replace(&self, set: &CompiledConstraintSet) -> Result<()> {
        self.sets.write().insert(set.key.clone(), set.clone());
        Ok(())
    }

    async fn replace_all(&self, sets: &[CompiledConstraintSet]) -> Result<()> {
        let mut stored = self.sets.write();
        for set in sets {
            stored.insert(set.key.clone(), set.clone());
        }
        Ok(())
    }

    async fn get(&self, key: &ConstraintSetKey) -> Result<Option<CompiledConstraintSet>> {
        Ok(self.sets.read().get(key).cloned())
    }

    async fn keys(&self) -> Result<Vec<ConstraintSetKey>> {
        Ok(self.sets.read().keys().cloned().collect())
    }
}
