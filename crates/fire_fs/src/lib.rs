//! Fire Gateway File System Layer
//!
//! Provides the root-jailed view of the shared directory:
//! - PathResolver: untrusted URL paths to root-confined absolute paths
//! - Directory listing with noise filtering and stable ordering
//! - Upload / mkdir primitives
//! - Hidden-attribute marking for metadata files
//! - Filename validation for Windows compatibility

mod resolver;
mod browser;
mod file_operations;
mod hidden;
mod sanitize;

pub use resolver::{PathResolver, RelativePath, ResolvedPath, lexical_clean};
pub use browser::{
    FileEntry, list_directory, is_media_file, is_symlink, sort_entries,
    IMAGE_EXTENSIONS, VIDEO_EXTENSIONS, LEGACY_MARKS_SUFFIX,
};
pub use file_operations::{write_file, overwrite_file, create_dir};
pub use hidden::mark_hidden;
pub use sanitize::{is_valid_filename, validate_component};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
