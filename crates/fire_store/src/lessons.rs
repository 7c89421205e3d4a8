//! Lesson plans, one JSON file per plan under `.fire_lessons/`

use crate::{Result, StoreError, LESSONS_DIR};
use fire_fs::RelativePath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A named slide deck built from shared media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonPlan {
    pub name: String,
    #[serde(default)]
    pub slides: Vec<Slide>,
    /// Unix seconds of the last save
    #[serde(default)]
    pub updated: i64,
}

/// Fields the UI stores that the gateway has no name for; kept verbatim
pub type Extra = Map<String, Value>;

/// One slide: a template id plus its named slot values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub template: String,
    #[serde(default)]
    pub slots: BTreeMap<String, SlotValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Value of a template slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    /// A point in a media file
    Marker {
        path: String,
        time: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(flatten)]
        extra: Extra,
    },
    /// A media file
    Media {
        path: String,
        #[serde(flatten)]
        extra: Extra,
    },
    /// Literal text
    Text(String),
    /// Anything the UI stores that has no dedicated shape
    Other(Value),
}

impl LessonPlan {
    /// Canonicalize every media path referenced by the slides
    fn normalize_paths(&mut self) {
        for slide in &mut self.slides {
            for value in slide.slots.values_mut() {
                match value {
                    SlotValue::Marker { path, .. } | SlotValue::Media { path, .. } => {
                        *path = RelativePath::parse(path).to_string();
                    }
                    SlotValue::Text(_) | SlotValue::Other(_) => {}
                }
            }
        }
    }
}

/// Lesson plan directory
pub struct LessonStore {
    dir: PathBuf,
    hide: bool,
}

impl LessonStore {
    pub fn open(root: &Path, hide: bool) -> Self {
        Self {
            dir: root.join(LESSONS_DIR),
            hide,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a plan, stamping `updated` with the current time
    ///
    /// The name becomes the file name, so it must be a single visible,
    /// Windows-valid component; it is trimmed before use.
    pub fn save(&self, mut plan: LessonPlan) -> Result<LessonPlan> {
        let name = checked_name(&plan.name)?.to_string();
        plan.name = name;
        plan.updated = chrono::Utc::now().timestamp();
        plan.normalize_paths();

        if !self.dir.is_dir() {
            fs::create_dir_all(&self.dir)?;
            if self.hide {
                if let Err(e) = fire_fs::mark_hidden(&self.dir) {
                    tracing::warn!("Failed to hide {}: {}", self.dir.display(), e);
                }
            }
        }

        let bytes = serde_json::to_vec_pretty(&plan)?;
        fire_fs::overwrite_file(&self.file_for(&plan.name), &bytes)?;

        tracing::info!("Saved lesson {:?} ({} slides)", plan.name, plan.slides.len());
        Ok(plan)
    }

    /// Names of all saved plans, in directory enumeration order
    pub fn list(&self) -> Vec<String> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(_) => return Vec::new(),
        };

        read_dir
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "json"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Result<LessonPlan> {
        let name = checked_name(name)?;
        let path = self.file_for(name);

        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("lesson {name}")));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

fn checked_name(name: &str) -> Result<&str> {
    fire_fs::validate_component(name).map_err(StoreError::InvalidName)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plan(name: &str) -> LessonPlan {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "slides": [
                {
                    "template": "title",
                    "slots": { "heading": "Light and shadow" }
                },
                {
                    "template": "video-clip",
                    "slots": {
                        "video": { "path": "/week1\\clip.mp4", "time": 12.5 },
                        "poster": { "path": "week1/./poster.png" },
                        "layout": { "columns": 2 }
                    }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_save_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = LessonStore::open(temp_dir.path(), true);

        let saved = store.save(plan("Week 1")).unwrap();
        assert!(saved.updated > 0);
        assert!(store.dir().is_dir());

        let loaded = store.get("Week 1").unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.slides.len(), 2);
    }

    #[test]
    fn test_slot_shapes() {
        let p = plan("x");
        let slots = &p.slides[1].slots;
        assert!(matches!(slots["video"], SlotValue::Marker { time, .. } if time == 12.5));
        assert!(matches!(slots["poster"], SlotValue::Media { .. }));
        assert!(matches!(slots["layout"], SlotValue::Other(_)));
        assert!(matches!(p.slides[0].slots["heading"], SlotValue::Text(_)));
    }

    #[test]
    fn test_paths_normalized_on_save() {
        let temp_dir = TempDir::new().unwrap();
        let store = LessonStore::open(temp_dir.path(), false);
        let saved = store.save(plan("n")).unwrap();

        match &saved.slides[1].slots["video"] {
            SlotValue::Marker { path, .. } => assert_eq!(path, "week1/clip.mp4"),
            other => panic!("unexpected slot {other:?}"),
        }
        match &saved.slides[1].slots["poster"] {
            SlotValue::Media { path, .. } => assert_eq!(path, "week1/poster.png"),
            other => panic!("unexpected slot {other:?}"),
        }
    }

    #[test]
    fn test_unknown_fields_survive_save() {
        let temp_dir = TempDir::new().unwrap();
        let store = LessonStore::open(temp_dir.path(), false);

        let plan: LessonPlan = serde_json::from_value(serde_json::json!({
            "name": "clips",
            "slides": [{
                "template": "video-range",
                "background": "#000",
                "notes": ["ask about shadows"],
                "slots": {
                    "v": { "path": "./a.mp4", "start": 3, "end": 9, "caption": "intro" },
                    "m": { "path": "b.mp4", "time": 4.5, "label": "here", "zoom": 2 }
                }
            }]
        }))
        .unwrap();
        store.save(plan).unwrap();

        let raw: Value =
            serde_json::from_slice(&fs::read(store.dir().join("clips.json")).unwrap()).unwrap();
        let slide = &raw["slides"][0];
        assert_eq!(slide["background"], "#000");
        assert_eq!(slide["notes"][0], "ask about shadows");
        assert_eq!(
            slide["slots"]["v"],
            serde_json::json!({ "path": "a.mp4", "start": 3, "end": 9, "caption": "intro" })
        );
        assert_eq!(
            slide["slots"]["m"],
            serde_json::json!({ "path": "b.mp4", "time": 4.5, "label": "here", "zoom": 2 })
        );

        let loaded = store.get("clips").unwrap();
        assert!(matches!(
            &loaded.slides[0].slots["v"],
            SlotValue::Media { extra, .. } if extra["caption"] == "intro"
        ));
    }

    #[test]
    fn test_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = LessonStore::open(temp_dir.path(), false);
        assert!(store.list().is_empty());

        store.save(plan("b")).unwrap();
        store.save(plan("a")).unwrap();
        fs::write(store.dir().join("notes.txt"), b"").unwrap();

        let mut names = store.list();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_get_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = LessonStore::open(temp_dir.path(), false);
        assert!(matches!(store.get("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_unsafe_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = LessonStore::open(temp_dir.path(), false);

        for name in ["", "   ", "../escape", "a/b", "a\\b", "..", ".hidden", "CON"] {
            assert!(
                matches!(store.save(plan(name)), Err(StoreError::InvalidName(_))),
                "{name:?}"
            );
            assert!(matches!(store.get(name), Err(StoreError::InvalidName(_))));
        }

        // Nothing was written anywhere
        assert!(!store.dir().exists());
        assert!(!temp_dir.path().join("escape.json").exists());
    }

    #[test]
    fn test_name_is_trimmed() {
        let temp_dir = TempDir::new().unwrap();
        let store = LessonStore::open(temp_dir.path(), false);
        let saved = store.save(plan("  spaced  ")).unwrap();
        assert_eq!(saved.name, "spaced");
        assert!(store.get("spaced").is_ok());
    }
}
