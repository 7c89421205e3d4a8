//! Gateway facade: the calls the HTTP layer makes
//!
//! Every call takes the raw, untrusted request path and runs it through the
//! resolver before touching the disk. Read-side metadata failures degrade to
//! empty results; write-side failures are returned.

use crate::network;
use crate::tree::{TreeBuilder, TreeNode};
use crate::{GatewayConfig, GatewayError};
use fire_fs::{FileEntry, PathResolver, RelativePath, ResolvedPath};
use fire_store::{
    derive_tags, merge_tags, LessonPlan, LessonStore, Marker, MarkerStore, TagMap, TagStore,
    LESSONS_DIR, MARKERS_FILE, TAGS_FILE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use url::Url;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Directory listing response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub files: Vec<FileEntry>,
    pub path: RelativePath,
}

/// Marker read response, and marker save request body
///
/// `markers` is required on input: a body without it is malformed, not a
/// request to clear the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerList {
    pub markers: Vec<Marker>,
}

/// What a static file server should send for a page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeTarget {
    /// A regular file under the root
    File(PathBuf),
    /// A directory's own `index.html`
    DirectoryIndex(PathBuf),
    /// The built-in management page
    ManagementUi,
}

/// Status response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub status: &'static str,
    /// LAN address browsers can reach, `ip:port`
    pub address: String,
    pub ip: String,
    pub root_dir: String,
}

/// Share link response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLink {
    pub url: String,
}

/// The shared-directory gateway
///
/// Holds no state besides the fixed root and the store handles, so one value
/// can serve every request thread.
pub struct Gateway {
    resolver: PathResolver,
    tags: TagStore,
    markers: MarkerStore,
    lessons: LessonStore,
    listen_addr: String,
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Self {
        let resolver = PathResolver::new(&config.general.root_dir);
        let root = resolver.root().to_path_buf();
        let hide = config.metadata.hide_files;

        tracing::info!("Gateway rooted at {}", root.display());

        Self {
            tags: TagStore::open(&root, hide),
            markers: MarkerStore::open(&root, hide),
            lessons: LessonStore::open(&root, hide),
            listen_addr: config.general.listen_addr.clone(),
            resolver,
        }
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Resolve a raw request path, or reject it
    ///
    /// Both the lexical jail and the physical one apply, so a symlink under
    /// the root cannot lead a request outside it.
    pub fn resolve_path(&self, raw: &str) -> Result<ResolvedPath> {
        let resolved = self.resolver.resolve(raw)?;
        self.resolver.confine(&resolved)?;
        Ok(resolved)
    }

    /// List one directory; a missing directory is an empty listing
    pub fn list_directory(&self, raw: &str) -> Result<Listing> {
        let resolved = self.resolve_path(raw)?;
        let files = fire_fs::list_directory(&resolved.absolute);
        tracing::debug!("Listed {:?}: {} entries", resolved.relative.as_str(), files.len());

        Ok(Listing {
            files,
            path: resolved.relative,
        })
    }

    pub fn read_markers(&self, raw: &str) -> Result<MarkerList> {
        let resolved = self.resolve_file_key(raw)?;
        Ok(MarkerList {
            markers: self.markers.markers_for(&resolved.relative),
        })
    }

    /// Replace the markers of one file from a `{"markers": [...]}` body
    pub fn write_markers(&self, raw: &str, body: &[u8]) -> Result<()> {
        let resolved = self.resolve_file_key(raw)?;
        let list: MarkerList = parse_body(body)?;
        self.markers.save(&resolved.relative, list.markers)?;
        Ok(())
    }

    /// Typed variant of [`Gateway::write_markers`]
    pub fn save_markers(&self, raw: &str, markers: Vec<Marker>) -> Result<()> {
        let resolved = self.resolve_file_key(raw)?;
        self.markers.save(&resolved.relative, markers)?;
        Ok(())
    }

    /// All tags, including the derived annotated tag for marked files
    pub fn read_tags(&self) -> TagMap {
        let markers = self.markers.read_all();
        merge_tags(self.tags.read(), derive_tags(markers.keys()))
    }

    /// Apply a partial tag update from a `{"<path>": ["tag", ...]}` body
    pub fn write_tags(&self, body: &[u8]) -> Result<()> {
        let updates: BTreeMap<String, Vec<String>> = parse_body(body)?;
        self.update_tags(updates)
    }

    /// Typed variant of [`Gateway::write_tags`]
    ///
    /// Every key is validated before anything is written.
    pub fn update_tags(&self, updates: BTreeMap<String, Vec<String>>) -> Result<()> {
        let mut cleaned = Vec::with_capacity(updates.len());
        for (raw, tags) in updates {
            let resolved = self.resolve_file_key(&raw)?;
            cleaned.push((resolved.relative, tags));
        }

        self.tags.apply_updates(cleaned)?;
        Ok(())
    }

    /// Media tree of the whole root
    pub fn build_tree(&self) -> Vec<TreeNode> {
        let markers = self.markers.read_all();
        let tags = merge_tags(self.tags.read(), derive_tags(markers.keys()));
        TreeBuilder::new(&self.resolver, tags, markers).build()
    }

    /// Save a lesson plan from its JSON body; returns the stored plan
    pub fn save_lesson(&self, body: &[u8]) -> Result<LessonPlan> {
        let plan: LessonPlan = parse_body(body)?;
        Ok(self.lessons.save(plan)?)
    }

    pub fn list_lessons(&self) -> Vec<String> {
        self.lessons.list()
    }

    pub fn get_lesson(&self, name: &str) -> Result<LessonPlan> {
        Ok(self.lessons.get(name)?)
    }

    /// Store an uploaded file, replacing any existing one
    pub fn upload<R: Read>(&self, raw: &str, reader: &mut R) -> Result<u64> {
        let resolved = self.resolve_writable(raw)?;
        Ok(fire_fs::write_file(&resolved.absolute, reader)?)
    }

    /// Create a directory (and its parents)
    pub fn make_dir(&self, raw: &str) -> Result<()> {
        let resolved = self.resolve_writable(raw)?;
        fire_fs::create_dir(&resolved.absolute)?;
        Ok(())
    }

    /// Resolve a direct file download (`/files/<path>`)
    pub fn file_for_download(&self, raw: &str) -> Result<ResolvedPath> {
        let resolved = self.resolve_file_key(raw)?;
        if !resolved.absolute.is_file() {
            return Err(GatewayError::NotFound(resolved.relative.to_string()));
        }
        Ok(resolved)
    }

    /// Decide what to send for a page request
    ///
    /// Directories (the root included) with their own `index.html` serve it
    /// unless `manage` is set; missing paths and plain directories get the
    /// management page.
    pub fn serve_target(&self, raw: &str, manage: bool) -> Result<ServeTarget> {
        let resolved = self.resolve_path(raw)?;

        let metadata = match std::fs::metadata(&resolved.absolute) {
            Ok(m) => m,
            Err(_) => return Ok(ServeTarget::ManagementUi),
        };

        if !metadata.is_dir() {
            return Ok(ServeTarget::File(resolved.absolute));
        }

        let index = resolved.absolute.join("index.html");
        if !manage && index.is_file() {
            Ok(ServeTarget::DirectoryIndex(index))
        } else {
            Ok(ServeTarget::ManagementUi)
        }
    }

    pub fn status(&self) -> Status {
        let ip = network::lan_ipv4().to_string();

        Status {
            status: "running",
            address: network::reachable_address(&ip, &self.listen_addr),
            ip,
            root_dir: self.root().display().to_string(),
        }
    }

    /// Download link for a file, as seen from a client that reached us at `host`
    ///
    /// Each path segment is percent-encoded.
    pub fn share_url(&self, host: &str, raw: &str) -> Result<ShareLink> {
        let resolved = self.resolve_file_key(raw)?;

        let mut url = Url::parse(&format!("http://{host}/files/"))
            .map_err(|e| GatewayError::MalformedInput(format!("host {host:?}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::MalformedInput(format!("host {host:?}")))?
            .pop_if_empty()
            .extend(resolved.relative.segments());

        Ok(ShareLink {
            url: url.to_string(),
        })
    }

    /// One-time import of legacy `<media>.marks.json` sidecars
    pub fn import_legacy_markers(&self) -> Result<usize> {
        Ok(self.markers.import_legacy(&self.resolver)?)
    }

    /// Resolve a path that must name something below the root
    fn resolve_file_key(&self, raw: &str) -> Result<ResolvedPath> {
        let resolved = self.resolve_path(raw)?;
        if resolved.relative.is_root() {
            return Err(GatewayError::MalformedInput("missing path".to_string()));
        }
        Ok(resolved)
    }

    /// Like `resolve_file_key`, and refuses the metadata files themselves
    fn resolve_writable(&self, raw: &str) -> Result<ResolvedPath> {
        let resolved = self.resolve_file_key(raw)?;

        let first = resolved.relative.segments().next().unwrap_or("");
        let reserved = [MARKERS_FILE, TAGS_FILE, LESSONS_DIR];
        if reserved.iter().any(|r| r.eq_ignore_ascii_case(first)) {
            tracing::warn!("Refused write to metadata path {:?}", resolved.relative.as_str());
            return Err(GatewayError::SafetyViolation(resolved.relative.to_string()));
        }

        Ok(resolved)
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| GatewayError::MalformedInput(e.to_string()))
}
