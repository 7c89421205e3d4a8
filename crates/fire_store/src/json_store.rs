//! Flat JSON-file key/value store

use crate::{Result, StoreError};
use fire_fs::RelativePath;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Keyed metadata storage, one value per relative path
pub trait MetadataStore<V> {
    /// Load every entry. Missing or malformed storage reads as empty.
    fn read_all(&self) -> BTreeMap<String, V>;

    /// Replace the whole document
    fn write_all(&self, entries: &BTreeMap<String, V>) -> Result<()>;

    fn get(&self, key: &RelativePath) -> Option<V>;

    fn put(&self, key: &RelativePath, value: V) -> Result<()>;

    /// Remove a key. Returns whether it was present.
    fn delete(&self, key: &RelativePath) -> Result<bool>;
}

/// A single JSON object on disk: `{ "<relative path>": V, ... }`
///
/// Every write is a full-file overwrite. Read-modify-write cycles inside one
/// process are serialized by `lock`; separate processes still race.
pub struct JsonFileStore<V> {
    path: PathBuf,
    hide: bool,
    lock: Mutex<()>,
    _value: PhantomData<fn() -> V>,
}

impl<V> JsonFileStore<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P, hide: bool) -> Self {
        Self {
            path: path.into(),
            hide,
            lock: Mutex::new(()),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the current document and persist the result
    pub fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut BTreeMap<String, V>) -> T,
    {
        let _guard = self.lock.lock();
        let mut entries = self.load();
        let out = f(&mut entries);
        self.store(&entries)?;
        Ok(out)
    }

    fn load(&self) -> BTreeMap<String, V> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Cannot read {}: {}", self.path.display(), e);
                }
                return BTreeMap::new();
            }
        };

        let raw: BTreeMap<String, V> = match serde_json::from_slice(&bytes) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Ignoring malformed {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };

        // Keys written by other tools may not be in canonical form
        raw.into_iter()
            .filter_map(|(key, value)| {
                let key = RelativePath::parse(&key);
                (!key.is_root()).then(|| (key.to_string(), value))
            })
            .collect()
    }

    fn store(&self, entries: &BTreeMap<String, V>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        fire_fs::overwrite_file(&self.path, &bytes)?;

        if self.hide {
            if let Err(e) = fire_fs::mark_hidden(&self.path) {
                tracing::warn!("Failed to hide {}: {}", self.path.display(), e);
            }
        }

        tracing::debug!("Saved {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl<V> MetadataStore<V> for JsonFileStore<V>
where
    V: Serialize + DeserializeOwned,
{
    fn read_all(&self) -> BTreeMap<String, V> {
        let _guard = self.lock.lock();
        self.load()
    }

    fn write_all(&self, entries: &BTreeMap<String, V>) -> Result<()> {
        let _guard = self.lock.lock();
        self.store(entries)
    }

    fn get(&self, key: &RelativePath) -> Option<V> {
        self.read_all().remove(key.as_str())
    }

    fn put(&self, key: &RelativePath, value: V) -> Result<()> {
        if key.is_root() {
            return Err(StoreError::InvalidKey("empty path".to_string()));
        }
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn delete(&self, key: &RelativePath) -> Result<bool> {
        self.update(|entries| entries.remove(key.as_str()).is_some())
    }
}
