//! Video timestamp markers keyed by relative path

use crate::{JsonFileStore, MetadataStore, Result, StoreError, MARKERS_FILE};
use fire_fs::{PathResolver, RelativePath, LEGACY_MARKS_SUFFIX};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A labelled point in a media file, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub time: f64,
    #[serde(default)]
    pub label: String,
}

/// `relative path -> markers`
pub type MarkerMap = BTreeMap<String, Vec<Marker>>;

/// Marker database (`.fire_markers.json`)
pub struct MarkerStore {
    store: JsonFileStore<Vec<Marker>>,
}

/// Shape of a legacy `<media>.marks.json` sidecar
#[derive(Deserialize)]
struct LegacySidecar {
    #[serde(default)]
    markers: Vec<Marker>,
}

impl MarkerStore {
    pub fn open(root: &Path, hide: bool) -> Self {
        Self {
            store: JsonFileStore::new(root.join(MARKERS_FILE), hide),
        }
    }

    pub fn read_all(&self) -> MarkerMap {
        self.store.read_all()
    }

    /// Markers for one file; absent means none
    pub fn markers_for(&self, key: &RelativePath) -> Vec<Marker> {
        self.store.get(key).unwrap_or_default()
    }

    /// Replace the full marker list for `key`
    ///
    /// An empty list is stored as an explicit `[]`.
    pub fn save(&self, key: &RelativePath, markers: Vec<Marker>) -> Result<()> {
        if let Some(bad) = markers.iter().find(|m| !m.time.is_finite() || m.time < 0.0) {
            return Err(StoreError::InvalidValue(format!(
                "marker time out of range: {}",
                bad.time
            )));
        }

        let count = markers.len();
        self.store.put(key, markers)?;
        tracing::debug!("Saved {} markers for {}", count, key);
        Ok(())
    }

    /// One-time import of per-file `<media>.marks.json` sidecars
    ///
    /// Each readable sidecar is merged in when its media path has no entry
    /// yet, then deleted. Unreadable sidecars are left in place. Returns the
    /// number of paths imported.
    pub fn import_legacy(&self, resolver: &PathResolver) -> Result<usize> {
        let mut found: Vec<(PathBuf, RelativePath, Vec<Marker>)> = Vec::new();

        for entry in WalkDir::new(resolver.root())
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            let Some(media_name) = name.strip_suffix(LEGACY_MARKS_SUFFIX) else {
                continue;
            };
            if media_name.is_empty() {
                continue;
            }

            let media_path = entry.path().with_file_name(media_name);
            let Some(key) = resolver.relative_of(&media_path) else {
                continue;
            };

            let sidecar: LegacySidecar = match std::fs::read(entry.path())
                .map_err(StoreError::from)
                .and_then(|bytes| serde_json::from_slice(&bytes).map_err(StoreError::from))
            {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Skipping sidecar {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            found.push((entry.path().to_path_buf(), key, sidecar.markers));
        }

        if found.is_empty() {
            return Ok(0);
        }

        let imported = self.store.update(|entries| {
            let mut imported = 0usize;
            for (_, key, markers) in &found {
                if !entries.contains_key(key.as_str()) {
                    entries.insert(key.to_string(), markers.clone());
                    imported += 1;
                }
            }
            imported
        })?;

        for (sidecar, _, _) in &found {
            if let Err(e) = std::fs::remove_file(sidecar) {
                tracing::warn!("Failed to remove sidecar {}: {}", sidecar.display(), e);
            }
        }

        tracing::info!(
            "Imported markers for {} files from {} legacy sidecars",
            imported,
            found.len()
        );
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn marker(time: f64, label: &str) -> Marker {
        Marker { time, label: label.to_string() }
    }

    #[test]
    fn test_save_replaces_wholesale() {
        let temp_dir = TempDir::new().unwrap();
        let store = MarkerStore::open(temp_dir.path(), true);
        let key = RelativePath::parse("videos/intro.mp4");

        store.save(&key, vec![marker(1.5, "start"), marker(30.0, "demo")]).unwrap();
        store.save(&key, vec![marker(12.25, "only")]).unwrap();

        assert_eq!(store.markers_for(&key), vec![marker(12.25, "only")]);
    }

    #[test]
    fn test_save_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = MarkerStore::open(temp_dir.path(), false);
        let key = RelativePath::parse("a.mp4");
        let markers = vec![marker(3.0, "x"), marker(4.5, "y")];
        let file = temp_dir.path().join(MARKERS_FILE);

        store.save(&key, markers.clone()).unwrap();
        let first = std::fs::read(&file).unwrap();
        store.save(&key, markers).unwrap();
        let second = std::fs::read(&file).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_list_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let store = MarkerStore::open(temp_dir.path(), false);
        let key = RelativePath::parse("a.mp4");

        store.save(&key, vec![marker(1.0, "x")]).unwrap();
        store.save(&key, Vec::new()).unwrap();

        let all = store.read_all();
        assert_eq!(all.get("a.mp4"), Some(&Vec::new()));
    }

    #[test]
    fn test_rejects_bad_time() {
        let temp_dir = TempDir::new().unwrap();
        let store = MarkerStore::open(temp_dir.path(), false);
        let key = RelativePath::parse("a.mp4");

        assert!(store.save(&key, vec![marker(f64::NAN, "x")]).is_err());
        assert!(store.save(&key, vec![marker(-1.0, "x")]).is_err());
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_missing_label_defaults() {
        let parsed: Vec<Marker> = serde_json::from_str(r#"[{"time": 2}]"#).unwrap();
        assert_eq!(parsed, vec![marker(2.0, "")]);
    }

    #[test]
    fn test_import_legacy_sidecars() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("week1")).unwrap();
        std::fs::write(root.join("week1/clip.mp4"), b"v").unwrap();
        std::fs::write(
            root.join("week1/clip.mp4.marks.json"),
            br#"{"markers": [{"time": 5.0, "label": "intro"}]}"#,
        )
        .unwrap();
        std::fs::write(root.join("kept.mp4.marks.json"), br#"{"markers": []}"#).unwrap();
        std::fs::write(root.join("broken.mp4.marks.json"), b"garbage").unwrap();

        let resolver = PathResolver::new(root);
        let store = MarkerStore::open(root, false);
        store
            .save(&RelativePath::parse("kept.mp4"), vec![marker(9.0, "newer")])
            .unwrap();

        let imported = store.import_legacy(&resolver).unwrap();
        assert_eq!(imported, 1);

        let all = store.read_all();
        assert_eq!(all["week1/clip.mp4"], vec![marker(5.0, "intro")]);
        assert_eq!(all["kept.mp4"], vec![marker(9.0, "newer")]);

        assert!(!root.join("week1/clip.mp4.marks.json").exists());
        assert!(!root.join("kept.mp4.marks.json").exists());
        assert!(root.join("broken.mp4.marks.json").exists());

        // Second run finds nothing left to import
        assert_eq!(store.import_legacy(&resolver).unwrap(), 0);
    }
}
