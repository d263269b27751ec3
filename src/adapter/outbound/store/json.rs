//! File-backed constraint set store.
//!
//! One pretty-printed JSON record per key under a directory. Writes go to a
//! temporary file that is renamed over the record, so readers never observe
//! a partial write.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::domain::compiled::CompiledConstraintSet;
use crate::domain::id::ConstraintSetKey;
use crate::error::{Result, StoreError};
use crate::port::ConstraintSetStore;

const EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSet {
    stored_at: DateTime<Utc>,
    set: CompiledConstraintSet,
}

/// Directory of JSON records, one per constraint set key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record for `key`.
    #[must_use]
    pub fn record_path(&self, key: &ConstraintSetKey) -> PathBuf {
        self.root.join(format!(
            "{}@{}.{EXTENSION}",
            encode(&key.scenario_name),
            encode(&key.constraint_set_name)
        ))
    }

    async fn write(&self, set: &CompiledConstraintSet) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| io_error(&self.root, source))?;

        let record = StoredSet {
            stored_at: Utc::now(),
            set: set.clone(),
        };
        let body = serde_json::to_vec_pretty(&record)?;
        let path = self.record_path(&set.key);
        let tmp = path.with_extension(format!("{EXTENSION}.tmp-{}", Uuid::new_v4().simple()));

        fs::write(&tmp, body)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|source| io_error(&path, source))?;
        debug!(set = %set.key, path = %path.display(), "constraint set stored");
        Ok(())
    }

    async fn read(path: &Path) -> Result<StoredSet> {
        let body = fs::read(path).await.map_err(|source| io_error(path, source))?;
        let record = serde_json::from_slice(&body).map_err(|source| StoreError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        Ok(record)
    }
}

impl ConstraintSetStore for JsonFileStore {
    async fn replace(&self, set: &CompiledConstraintSet) -> Result<()> {
        self.write(set).await
    }

    async fn replace_all(&self, sets: &[CompiledConstraintSet]) -> Result<()> {
        for set in sets {
            self.write(set).await?;
        }
        Ok(())
    }

    async fn get(&self, key: &ConstraintSetKey) -> Result<Option<CompiledConstraintSet>> {
        let path = self.record_path(key);
        match fs::try_exists(&path).await {
            Ok(true) => Ok(Some(Self::read(&path).await?.set)),
            Ok(false) => Ok(None),
            Err(source) => Err(io_error(&path, source).into()),
        }
    }

    async fn keys(&self) -> Result<Vec<ConstraintSetKey>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_error(&self.root, source).into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| io_error(&self.root, source))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            keys.push(Self::read(&path).await?.set.key);
        }
        keys.sort();
        Ok(keys)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// File-name-safe form of a key component; anything outside
/// `[A-Za-z0-9_-]` becomes `%XX`.
fn encode(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for byte in component.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
