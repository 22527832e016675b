//! Asset index: the folder/file tree of selectable media.
//!
//! The listing endpoint returns either a nested folder object
//! `{path, folders: [...], images: [{url, thumb?}]}` or a flat array of
//! images. Both become an [`AssetTree`], an arena of folders and leaves
//! addressed by index. The tree is immutable once built.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::EditorError;

/// Path of the synthetic root folder used for flat listings.
pub const ROOT_PATH: &str = "/";

/// Image entry as it appears in the index response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexImage {
    pub url: String,
    /// Pre-generated thumbnail. When absent the thumbnail endpoint is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// Folder entry as it appears in the index response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFolder {
    pub path: String,
    #[serde(default)]
    pub folders: Vec<IndexFolder>,
    #[serde(default)]
    pub images: Vec<IndexImage>,
}

/// Raw asset index response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetIndex {
    Tree(IndexFolder),
    Flat(Vec<IndexImage>),
}

/// Link target from the page listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub url: String,
    pub title: String,
}

impl PageDescriptor {
    /// Parse the page listing response.
    pub fn parse_list(json: &str) -> Result<Vec<PageDescriptor>, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafId(pub usize);

impl fmt::Display for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub path: String,
    /// Last path segment, used as the display label.
    pub name: SmolStr,
    pub parent: Option<FolderId>,
    pub folders: Vec<FolderId>,
    pub leaves: Vec<LeafId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub url: String,
    pub thumb: Option<String>,
    /// File name (URL after the last `/`).
    pub title: SmolStr,
    /// Folder whose listing contained this leaf.
    pub folder: FolderId,
}

/// Folder/file tree built from one index response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTree {
    folders: Vec<Folder>,
    leaves: Vec<Leaf>,
    by_path: HashMap<String, FolderId>,
}

/// Text after the last `/`, or the whole string.
pub fn last_segment(s: &str) -> &str {
    s.rsplit_once('/').map_or(s, |(_, tail)| tail)
}

impl AssetTree {
    /// Parse an index response and build the tree.
    pub fn parse(json: &str) -> Result<Self, EditorError> {
        let index: AssetIndex = serde_json::from_str(json)?;
        Ok(Self::from_index(index))
    }

    /// Build the tree breadth-first from a worklist, so folder depth never
    /// grows the call stack.
    pub fn from_index(index: AssetIndex) -> Self {
        let root = match index {
            AssetIndex::Tree(folder) => folder,
            AssetIndex::Flat(images) => IndexFolder {
                path: ROOT_PATH.to_owned(),
                folders: Vec::new(),
                images,
            },
        };

        let mut tree = AssetTree {
            folders: Vec::new(),
            leaves: Vec::new(),
            by_path: HashMap::new(),
        };

        let mut queue: VecDeque<(IndexFolder, Option<FolderId>)> = VecDeque::new();
        queue.push_back((root, None));

        while let Some((raw, parent)) = queue.pop_front() {
            let id = FolderId(tree.folders.len());
            let IndexFolder {
                path,
                folders,
                images,
            } = raw;

            if tree.by_path.contains_key(&path) {
                tracing::warn!(path = %path, "duplicate folder path in asset index");
            } else {
                tree.by_path.insert(path.clone(), id);
            }

            let mut leaves = Vec::with_capacity(images.len());
            for image in images {
                let leaf_id = LeafId(tree.leaves.len());
                tree.leaves.push(Leaf {
                    title: SmolStr::new(last_segment(&image.url)),
                    url: image.url,
                    thumb: image.thumb,
                    folder: id,
                });
                leaves.push(leaf_id);
            }

            tree.folders.push(Folder {
                name: SmolStr::new(last_segment(&path)),
                path,
                parent,
                folders: Vec::with_capacity(folders.len()),
                leaves,
            });
            if let Some(parent) = parent {
                tree.folders[parent.0].folders.push(id);
            }

            for child in folders {
                queue.push_back((child, Some(id)));
            }
        }

        tracing::debug!(
            folders = tree.folders.len(),
            leaves = tree.leaves.len(),
            "built asset tree"
        );
        tree
    }

    pub fn root(&self) -> FolderId {
        FolderId(0)
    }

    pub fn folder(&self, id: FolderId) -> &Folder {
        &self.folders[id.0]
    }

    pub fn leaf(&self, id: LeafId) -> &Leaf {
        &self.leaves[id.0]
    }

    pub fn get_leaf(&self, id: LeafId) -> Option<&Leaf> {
        self.leaves.get(id.0)
    }

    pub fn folder_by_path(&self, path: &str) -> Option<FolderId> {
        self.by_path.get(path).copied()
    }

    pub fn leaf_by_url(&self, url: &str) -> Option<LeafId> {
        self.leaves.iter().position(|l| l.url == url).map(LeafId)
    }

    pub fn folders(&self) -> impl Iterator<Item = (FolderId, &Folder)> {
        self.folders.iter().enumerate().map(|(i, f)| (FolderId(i), f))
    }

    pub fn leaves(&self) -> impl Iterator<Item = (LeafId, &Leaf)> {
        self.leaves.iter().enumerate().map(|(i, l)| (LeafId(i), l))
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Indented outline of the tree, depth-first, for logs and tests.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let folder = self.folder(id);
            let indent = "  ".repeat(depth);
            out.push_str(&format!("{indent}{}\n", folder.path));
            for leaf in &folder.leaves {
                let leaf = self.leaf(*leaf);
                let marker = if leaf.thumb.is_some() { " [thumb]" } else { "" };
                out.push_str(&format!("{indent}  {}{marker}\n", leaf.title));
            }
            for child in folder.folders.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }
}
