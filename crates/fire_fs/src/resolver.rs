//! PathResolver - maps untrusted relative paths onto the shared root
//!
//! Every path that reaches the file system goes through here first. Cleaning
//! and the root-jail check are purely lexical, so a rejected path costs no
//! I/O. `confine` adds the physical check: symlinks are resolved and the
//! real target must still lie under the real root.

use crate::{FsError, Result};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A normalized, slash-separated path relative to the shared root
///
/// Contains no `.`, `..` or empty segments. The empty path denotes the root
/// itself. This is the key used by every metadata store.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    /// The root itself
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Clean a raw, untrusted path string
    ///
    /// Backslashes become slashes, surrounding slashes and whitespace are
    /// trimmed, `.` and empty segments vanish, and `..` pops the previous
    /// segment. A `..` with nothing left to pop is dropped rather than
    /// climbing above the root.
    pub fn parse(raw: &str) -> Self {
        let unified = raw.replace('\\', "/");
        let trimmed = unified.trim_matches(|c: char| c == '/' || c.is_whitespace());

        let mut stack: Vec<&str> = Vec::new();
        for segment in trimmed.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    stack.pop();
                }
                other => stack.push(other),
            }
        }

        // Second pass over the cleaned form; nothing should survive here
        stack.retain(|s| !matches!(*s, "" | "." | ".."));

        Self(stack.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment (empty for the root)
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Append a single directory-entry name
    pub fn join(&self, name: &str) -> Self {
        if self.is_root() {
            Self::parse(name)
        } else {
            Self::parse(&format!("{}/{}", self.0, name))
        }
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelativePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// A path that passed the root-jail check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub relative: RelativePath,
    pub absolute: PathBuf,
}

/// Resolves request paths against a fixed root directory
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given root (cleaned lexically, not canonicalized)
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: lexical_clean(root.as_ref()),
        }
    }

    /// The cleaned root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a raw request path
    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath> {
        self.resolve_relative(&RelativePath::parse(raw))
    }

    /// Resolve an already-cleaned relative path
    pub fn resolve_relative(&self, relative: &RelativePath) -> Result<ResolvedPath> {
        let mut absolute = self.root.clone();
        for segment in relative.segments() {
            absolute.push(segment);
        }

        if !self.contains(&absolute) {
            tracing::warn!("Rejected path outside root: {:?}", relative.as_str());
            return Err(FsError::AccessDenied(relative.to_string()));
        }

        Ok(ResolvedPath {
            relative: relative.clone(),
            absolute,
        })
    }

    /// Root-jail check: does `path` (after lexical cleaning) lie under the root?
    ///
    /// Components are compared case-insensitively so that `D:\Fire` and
    /// `d:\fire\x` match, while `D:\Fire2` does not.
    pub fn contains(&self, path: &Path) -> bool {
        is_under(&self.root, &lexical_clean(path))
    }

    /// Physical root-jail check for a lexically resolved path
    ///
    /// The nearest existing ancestor of `path` (the path itself included) is
    /// canonicalized and must lie under the canonical root. An entry that
    /// exists but cannot be canonicalized, such as a dangling symlink, is
    /// refused. Nothing is checked while the root itself does not exist.
    pub fn confine(&self, resolved: &ResolvedPath) -> Result<()> {
        let real_root = match self.root.canonicalize() {
            Ok(r) => r,
            Err(_) => return Ok(()),
        };

        for ancestor in resolved.absolute.ancestors() {
            if fs::symlink_metadata(ancestor).is_err() {
                continue;
            }

            let inside = ancestor
                .canonicalize()
                .map(|real| is_under(&real_root, &real))
                .unwrap_or(false);

            if inside {
                return Ok(());
            }

            tracing::warn!(
                "Rejected path leaving root through a link: {:?}",
                resolved.relative.as_str()
            );
            return Err(FsError::AccessDenied(resolved.relative.to_string()));
        }

        Ok(())
    }

    /// Relative path of an absolute path under the root, if it is under the root
    pub fn relative_of(&self, path: &Path) -> Option<RelativePath> {
        if !self.contains(path) {
            return None;
        }

        let cleaned = lexical_clean(path);
        let rest: Vec<String> = cleaned
            .components()
            .skip(self.root.components().count())
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();

        Some(RelativePath::parse(&rest.join("/")))
    }
}

/// Component-wise, case-insensitive prefix test
fn is_under(root: &Path, path: &Path) -> bool {
    let mut candidate = path.components();

    for root_part in root.components() {
        match candidate.next() {
            Some(part) if eq_ignore_case(root_part, part) => {}
            _ => return false,
        }
    }

    true
}

fn eq_ignore_case(a: Component<'_>, b: Component<'_>) -> bool {
    a.as_os_str().to_string_lossy().to_lowercase() == b.as_os_str().to_string_lossy().to_lowercase()
}

/// Lexically normalize a path: drop `.`, let `..` pop a normal component
///
/// `..` never pops a root or drive prefix.
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    parts.iter().map(|c| c.as_os_str()).collect()
}
