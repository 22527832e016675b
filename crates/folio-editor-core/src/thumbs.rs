//! Lazy thumbnail scheduling.
//!
//! Tiles start without an image source. Only tiles in the visible folder are
//! ever given one, and generated thumbnails are requested strictly one at a
//! time: the next request is issued when the previous one settles (loads or
//! fails). Pre-generated thumbnails from the index cost no endpoint request
//! and are assigned as soon as their folder is shown.

use crate::asset::{AssetTree, FolderId, LeafId};
use crate::config::EditorConfig;

/// A source assignment for one tile image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbUpdate {
    pub leaf: LeafId,
    pub src: String,
    /// True when `src` is a thumbnail endpoint request that the chain waits on.
    /// The view must report its load or error through `settle`.
    pub tracked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ThumbnailChain {
    src: Vec<Option<String>>,
    in_flight: Option<LeafId>,
}

impl ThumbnailChain {
    pub fn new(leaf_count: usize) -> Self {
        Self {
            src: vec![None; leaf_count],
            in_flight: None,
        }
    }

    /// Source assigned to a tile so far.
    pub fn src(&self, leaf: LeafId) -> Option<&str> {
        self.src.get(leaf.0).and_then(|s| s.as_deref())
    }

    /// The endpoint request currently outstanding, if any.
    pub fn in_flight(&self) -> Option<LeafId> {
        self.in_flight
    }

    /// Assign sources in `folder`.
    ///
    /// Every sourceless tile with a pre-generated thumbnail gets it directly.
    /// If no endpoint request is outstanding, the first remaining sourceless
    /// tile gets one. Tiles that already have a source are never touched, so
    /// calling this repeatedly is harmless.
    pub fn advance(
        &mut self,
        tree: &AssetTree,
        folder: FolderId,
        config: &EditorConfig,
    ) -> Vec<ThumbUpdate> {
        let mut updates = Vec::new();
        let mut next_fetch = None;

        for &leaf_id in &tree.folder(folder).leaves {
            if self.src[leaf_id.0].is_some() {
                continue;
            }
            let leaf = tree.leaf(leaf_id);
            match &leaf.thumb {
                Some(thumb) => {
                    self.src[leaf_id.0] = Some(thumb.clone());
                    updates.push(ThumbUpdate {
                        leaf: leaf_id,
                        src: thumb.clone(),
                        tracked: false,
                    });
                }
                None if next_fetch.is_none() => next_fetch = Some(leaf_id),
                None => {}
            }
        }

        if self.in_flight.is_none() {
            if let Some(leaf_id) = next_fetch {
                let url = config.thumbnail_url(&tree.leaf(leaf_id).url);
                tracing::debug!(leaf = %leaf_id, url = %url, "requesting thumbnail");
                self.src[leaf_id.0] = Some(url.clone());
                self.in_flight = Some(leaf_id);
                updates.push(ThumbUpdate {
                    leaf: leaf_id,
                    src: url,
                    tracked: true,
                });
            }
        }

        updates
    }

    /// Record that a tracked request finished, successfully or not.
    ///
    /// Returns true if it was the outstanding request. The caller then
    /// calls `advance` for the folder currently shown.
    pub fn settle(&mut self, leaf: LeafId) -> bool {
        if self.in_flight == Some(leaf) {
            self.in_flight = None;
            true
        } else {
            tracing::debug!(leaf = %leaf, "ignoring settle for untracked thumbnail");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> AssetTree {
        AssetTree::parse(
            r#"{
                "path": "/",
                "folders": [
                    {"path": "/a", "folders": [], "images": [
                        {"url": "/media/a/1.jpg"},
                        {"url": "/media/a/2.jpg", "thumb": "/t/2.jpg"},
                        {"url": "/media/a/3.jpg"}
                    ]}
                ],
                "images": [
                    {"url": "/media/r1.jpg"},
                    {"url": "/media/r2.jpg"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_one_request_at_a_time() {
        let tree = tree();
        let config = EditorConfig::default();
        let mut chain = ThumbnailChain::new(tree.leaf_count());
        let root = tree.root();

        let first = chain.advance(&tree, root, &config);
        assert_eq!(first.len(), 1);
        assert!(first[0].tracked);
        assert_eq!(first[0].src, "/admin/content/get_thumbnail?f=r1.jpg");

        // Nothing more while the first request is outstanding.
        assert!(chain.advance(&tree, root, &config).is_empty());

        assert!(chain.settle(first[0].leaf));
        let second = chain.advance(&tree, root, &config);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].src, "/admin/content/get_thumbnail?f=r2.jpg");

        assert!(chain.settle(second[0].leaf));
        assert!(chain.advance(&tree, root, &config).is_empty());
        assert_eq!(chain.in_flight(), None);
    }

    #[test]
    fn test_hidden_folders_untouched() {
        let tree = tree();
        let config = EditorConfig::default();
        let mut chain = ThumbnailChain::new(tree.leaf_count());
        chain.advance(&tree, tree.root(), &config);

        let a = tree.folder_by_path("/a").unwrap();
        for leaf in &tree.folder(a).leaves {
            assert_eq!(chain.src(*leaf), None);
        }
    }

    #[test]
    fn test_presets_assigned_while_request_outstanding() {
        let tree = tree();
        let config = EditorConfig::default();
        let mut chain = ThumbnailChain::new(tree.leaf_count());

        // Root request still in flight when the user opens /a.
        let root_req = chain.advance(&tree, tree.root(), &config);
        let a = tree.folder_by_path("/a").unwrap();
        let updates = chain.advance(&tree, a, &config);
        assert_eq!(
            updates,
            vec![ThumbUpdate {
                leaf: tree.leaf_by_url("/media/a/2.jpg").unwrap(),
                src: "/t/2.jpg".to_owned(),
                tracked: false,
            }]
        );

        // Settling the stale root request lets /a continue.
        assert!(chain.settle(root_req[0].leaf));
        let next = chain.advance(&tree, a, &config);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].leaf, tree.leaf_by_url("/media/a/1.jpg").unwrap());
        assert!(next[0].tracked);
    }

    #[test]
    fn test_settle_unknown_is_ignored() {
        let tree = tree();
        let mut chain = ThumbnailChain::new(tree.leaf_count());
        assert!(!chain.settle(LeafId(0)));
    }
}
