//! Constraint set store contract, run against every adapter.

mod support;

use portfolio_solver::adapter::outbound::store::{InMemoryStore, JsonFileStore};
use portfolio_solver::application::compile;
use portfolio_solver::domain::{CompiledConstraintSet, ConstraintSetKey};
use portfolio_solver::error::{Error, StoreError};
use portfolio_solver::port::{ConstraintSetStore, KpiRegistry};
use rust_decimal_macros::dec;
use tempfile::TempDir;

use support::fixtures::{cap, catalog, exclude_pair, mandatory, target, SCENARIO, SET};

fn compiled_sets() -> Vec<CompiledConstraintSet> {
    let mut stretch = mandatory("C");
    stretch.constraint_set_name = "stretch".into();
    let rows = vec![
        cap("all", "", dec!(500)),
        mandatory("A"),
        exclude_pair("A", "B"),
        stretch,
    ];
    let targets = vec![target("all", "", "revenue", "floor", dec!(100))];
    let out = compile(&rows, &targets, &catalog().valid_kpi_keys());
    assert!(!out.has_errors());
    out.sets.into_values().collect()
}

async fn exercise(store: &impl ConstraintSetStore) {
    let key = ConstraintSetKey::new(SCENARIO, SET);
    assert!(store.get(&key).await.expect("get").is_none());
    assert!(store.keys().await.expect("keys").is_empty());

    let sets = compiled_sets();
    store.replace_all(&sets).await.expect("replace_all");
    assert_eq!(
        store.keys().await.expect("keys"),
        vec![key.clone(), ConstraintSetKey::new(SCENARIO, "stretch")]
    );
    let stored = store.get(&key).await.expect("get").expect("stored");
    assert_eq!(&stored, sets.iter().find(|s| s.key == key).expect("default set"));

    let mut updated = stored.clone();
    updated.mandatory.clear();
    store.replace(&updated).await.expect("replace");
    let reread = store.get(&key).await.expect("get").expect("stored");
    assert!(reread.mandatory.is_empty());
    assert_eq!(store.keys().await.expect("keys").len(), 2);
}

#[tokio::test]
async fn in_memory_store_honors_the_contract() {
    let store = InMemoryStore::new();
    exercise(&store).await;
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn json_store_honors_the_contract() {
    let dir = TempDir::new().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("sets"));
    exercise(&store).await;
}

#[tokio::test]
async fn json_store_survives_reopening() {
    let dir = TempDir::new().expect("tempdir");
    let sets = compiled_sets();
    JsonFileStore::new(dir.path())
        .replace_all(&sets)
        .await
        .expect("write");

    let reopened = JsonFileStore::new(dir.path());
    for set in &sets {
        let stored = reopened.get(&set.key).await.expect("get").expect("stored");
        assert_eq!(&stored, set);
    }
}

#[tokio::test]
async fn json_store_handles_awkward_key_names() {
    let dir = TempDir::new().expect("tempdir");
    let store = JsonFileStore::new(dir.path());
    let key = ConstraintSetKey::new("Q3 / downturn", "v2@draft");
    store
        .replace(&CompiledConstraintSet::new(key.clone()))
        .await
        .expect("write");

    let path = store.record_path(&key);
    assert_eq!(path.parent(), Some(dir.path()));
    assert!(path.exists());
    assert_eq!(store.keys().await.expect("keys"), vec![key]);
}

#[tokio::test]
async fn json_store_reports_corrupt_records() {
    let dir = TempDir::new().expect("tempdir");
    let store = JsonFileStore::new(dir.path());
    let key = ConstraintSetKey::new(SCENARIO, SET);
    std::fs::write(store.record_path(&key), "{ not json").expect("write");

    let err = store.get(&key).await.expect_err("corrupt record");
    assert!(matches!(err, Error::Store(StoreError::Corrupt { .. })));
}

#[tokio::test]
async fn json_store_ignores_foreign_files() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("README.txt"), "not a set").expect("write");
    let store = JsonFileStore::new(dir.path());

    assert!(store.keys().await.expect("keys").is_empty());
}
