//! Store operator implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::compiled::CompiledConstraintSet;
use crate::domain::id::ConstraintSetKey;
use crate::error::Result;
use crate::infrastructure::factory::build_store;
use crate::port::inbound::operator::store::StoreOperator;
use crate::port::ConstraintSetStore;

use super::entry::Operator;

#[async_trait]
impl StoreOperator for Operator {
    fn store_location(&self, store: Option<&Path>) -> PathBuf {
        build_store(&self.config, store).root().to_path_buf()
    }

    async fn store_sets(&self, store: Option<&Path>, sets: &[CompiledConstraintSet]) -> Result<()> {
        build_store(&self.config, store).replace_all(sets).await
    }

    async fn stored_set(
        &self,
        store: Option<&Path>,
        key: &ConstraintSetKey,
    ) -> Result<Option<CompiledConstraintSet>> {
        build_store(&self.config, store).get(key).await
    }

    async fn stored_keys(&self, store: Option<&Path>) -> Result<Vec<ConstraintSetKey>> {
        build_store(&self.config, store).keys().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn override_directory_round_trips_sets() {
        let dir = TempDir::new().unwrap();
        let operator = Operator::default();
        let key = ConstraintSetKey::new("base", "default");

        operator
            .store_sets(Some(dir.path()), &[CompiledConstraintSet::new(key.clone())])
            .await
            .unwrap();

        assert_eq!(operator.store_location(Some(dir.path())), dir.path());
        assert_eq!(operator.stored_keys(Some(dir.path())).await.unwrap(), vec![key.clone()]);
        assert!(operator.stored_set(Some(dir.path()), &key).await.unwrap().is_some());
    }
}
