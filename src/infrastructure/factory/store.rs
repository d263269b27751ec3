//! Store factory.

use std::path::Path;

use crate::adapter::outbound::store::JsonFileStore;
use crate::infrastructure::config::Config;

/// File store at `override_path` or the configured `[store] path`.
pub fn build_store(config: &Config, override_path: Option<&Path>) -> JsonFileStore {
    let root = override_path.unwrap_or(&config.store.path);
    JsonFileStore::new(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_path_can_be_overridden() {
        let config = Config::default();
        let store = build_store(&config, Some(Path::new("/tmp/sets")));
        assert_eq!(store.root(), Path::new("/tmp/sets"));
        assert_eq!(build_store(&config, None).root(), config.store.path.as_path());
    }
}
