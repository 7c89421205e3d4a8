//! Free-text tags keyed by relative path

use crate::{JsonFileStore, MetadataStore, Result, ANNOTATED_TAG, TAGS_FILE};
use fire_fs::RelativePath;
use std::collections::BTreeMap;
use std::path::Path;

/// `relative path -> tags`
pub type TagMap = BTreeMap<String, Vec<String>>;

/// Tag database (`.fire_tags.json`)
pub struct TagStore {
    store: JsonFileStore<Vec<String>>,
}

impl TagStore {
    pub fn open(root: &Path, hide: bool) -> Self {
        Self {
            store: JsonFileStore::new(root.join(TAGS_FILE), hide),
        }
    }

    /// Persisted tags only (no derived tags)
    pub fn read(&self) -> TagMap {
        self.store.read_all()
    }

    pub fn tags_for(&self, key: &RelativePath) -> Vec<String> {
        self.store.get(key).unwrap_or_default()
    }

    /// Apply a partial update
    ///
    /// Each mentioned key has its list replaced; an empty list removes the
    /// key. Unmentioned keys are untouched. Labels are trimmed and
    /// deduplicated, and the derived annotated tag is never stored.
    pub fn apply_updates(&self, updates: Vec<(RelativePath, Vec<String>)>) -> Result<()> {
        let (removed, replaced) = self.store.update(|entries| {
            let mut removed = 0usize;
            let mut replaced = 0usize;

            for (key, tags) in updates {
                if key.is_root() {
                    continue;
                }
                let tags = clean_tags(tags);
                if tags.is_empty() {
                    if entries.remove(key.as_str()).is_some() {
                        removed += 1;
                    }
                } else {
                    entries.insert(key.to_string(), tags);
                    replaced += 1;
                }
            }

            (removed, replaced)
        })?;

        tracing::debug!("Tags updated: {} replaced, {} removed", replaced, removed);
        Ok(())
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || tag == ANNOTATED_TAG {
            continue;
        }
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Read-time overlay: every marker key gets the annotated tag
pub fn derive_tags<'a, I>(marker_keys: I) -> TagMap
where
    I: IntoIterator<Item = &'a String>,
{
    marker_keys
        .into_iter()
        .map(|key| (key.clone(), vec![ANNOTATED_TAG.to_string()]))
        .collect()
}

/// Merge an overlay into explicit tags, appending labels not already present
pub fn merge_tags(mut explicit: TagMap, overlay: TagMap) -> TagMap {
    for (key, extra) in overlay {
        let tags = explicit.entry(key).or_default();
        for tag in extra {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    explicit
}
