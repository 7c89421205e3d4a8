//! Directory listing for the shared tree

use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

/// Suffix of the old per-file marker sidecars (`clip.mp4.marks.json`)
pub const LEGACY_MARKS_SUFFIX: &str = ".marks.json";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "mkv", "avi", "m4v", "ogv"];

/// One directory child, as seen at listing time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

impl FileEntry {
    /// Check if this is an image or video file
    pub fn is_media(&self) -> bool {
        !self.is_dir && is_media_file(&self.name)
    }
}

/// Check a file name against the media extension set (case-insensitive)
pub fn is_media_file(name: &str) -> bool {
    let extension = match Path::new(name).extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase(),
        None => return false,
    };

    IMAGE_EXTENSIONS.contains(&extension.as_str()) || VIDEO_EXTENSIONS.contains(&extension.as_str())
}

/// List directory contents
///
/// Never fails: a missing or unreadable directory is an empty listing.
/// Dotfiles, legacy marker sidecars and entries whose metadata cannot be
/// read are skipped.
pub fn list_directory<P: AsRef<Path>>(path: P) -> Vec<FileEntry> {
    let path = path.as_ref();

    let read_dir = match fs::read_dir(path) {
        Ok(rd) => rd,
        Err(e) => {
            tracing::debug!("Cannot read directory {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut entries = Vec::new();

    for entry in read_dir {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || name.ends_with(LEGACY_MARKS_SUFFIX) {
            continue;
        }

        // Follows symlinks, like a stat on the joined path would
        let metadata = match fs::metadata(entry.path()) {
            Ok(m) => m,
            Err(_) => continue, // Skip entries we can't read
        };

        entries.push(FileEntry {
            name,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
        });
    }

    sort_entries(&mut entries);
    entries
}

/// Is `path` itself a symbolic link (not followed)?
///
/// Unreadable entries count as links so that callers skip them.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(true)
}

/// Directories first, then case-insensitive name order
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| {
        if a.is_dir != b.is_dir {
            return if a.is_dir { Ordering::Less } else { Ordering::Greater };
        }

        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}
