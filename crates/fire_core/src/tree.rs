//! Media tree: directory structure merged with tags and markers

use fire_fs::{is_symlink, list_directory, PathResolver, RelativePath};
use fire_store::{Marker, MarkerMap, TagMap};
use serde::Serialize;

/// Recursion stops here
const MAX_DEPTH: usize = 32;

/// One node of the media tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    pub path: RelativePath,
    pub is_dir: bool,
    pub tags: Vec<String>,
    /// Files only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<Marker>>,
    /// Directories only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

/// Builds the tree from one snapshot of the tag and marker databases
pub struct TreeBuilder<'a> {
    resolver: &'a PathResolver,
    tags: TagMap,
    markers: MarkerMap,
}

impl<'a> TreeBuilder<'a> {
    /// `tags` should already contain the derived overlay
    pub fn new(resolver: &'a PathResolver, tags: TagMap, markers: MarkerMap) -> Self {
        Self {
            resolver,
            tags,
            markers,
        }
    }

    /// Walk the whole root
    ///
    /// Only media files are kept; directories with no media anywhere below
    /// them are pruned. Symbolic links are never followed, so link cycles
    /// and links leading out of the root contribute nothing.
    pub fn build(&self) -> Vec<TreeNode> {
        self.build_dir(&RelativePath::root(), 0)
    }

    fn build_dir(&self, dir: &RelativePath, depth: usize) -> Vec<TreeNode> {
        if depth >= MAX_DEPTH {
            tracing::warn!("Tree depth limit reached at {:?}", dir.as_str());
            return Vec::new();
        }

        let resolved = match self.resolver.resolve_relative(dir) {
            Ok(r) => r,
            Err(_) => return Vec::new(),
        };

        let mut nodes = Vec::new();

        for entry in list_directory(&resolved.absolute) {
            if is_symlink(&resolved.absolute.join(&entry.name)) {
                continue;
            }

            let path = dir.join(&entry.name);

            if entry.is_dir {
                let children = self.build_dir(&path, depth + 1);
                if children.is_empty() {
                    continue;
                }
                nodes.push(TreeNode {
                    tags: self.tags_for(&path),
                    name: entry.name,
                    path,
                    is_dir: true,
                    markers: None,
                    children: Some(children),
                });
            } else if entry.is_media() {
                nodes.push(TreeNode {
                    tags: self.tags_for(&path),
                    markers: Some(self.markers.get(path.as_str()).cloned().unwrap_or_default()),
                    name: entry.name,
                    path,
                    is_dir: false,
                    children: None,
                });
            }
        }

        nodes
    }

    fn tags_for(&self, path: &RelativePath) -> Vec<String> {
        self.tags.get(path.as_str()).cloned().unwrap_or_default()
    }
}
