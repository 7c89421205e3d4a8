//! Fire Gateway Metadata Layer
//!
//! Provides:
//! - A keyed JSON-document store (one flat file per concern)
//! - Tags and video markers keyed by relative path
//! - Lesson plans, one file per plan

mod json_store;
mod tags;
mod markers;
mod lessons;

pub use json_store::{JsonFileStore, MetadataStore};
pub use tags::{TagMap, TagStore, derive_tags, merge_tags};
pub use markers::{Marker, MarkerMap, MarkerStore};
pub use lessons::{LessonPlan, LessonStore, Slide, SlotValue};

use thiserror::Error;

/// Marker database file name, under the root
pub const MARKERS_FILE: &str = ".fire_markers.json";

/// Tag database file name, under the root
pub const TAGS_FILE: &str = ".fire_tags.json";

/// Lesson plan directory name, under the root
pub const LESSONS_DIR: &str = ".fire_lessons";

/// Tag reported for every path that has markers; computed, never stored
pub const ANNOTATED_TAG: &str = "annotated";

/// Metadata store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File system error: {0}")]
    Fs(#[from] fire_fs::FsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
