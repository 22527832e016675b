//! Image picker state machine.
//!
//! Holds everything the image dialog shows: which folder is open, which
//! tile is selected, the pending src/width/height, and the thumbnail chain.
//! The browser layer renders this state and forwards DOM events to the
//! methods here; nothing in this module touches the DOM.

use crate::LoadState;
use crate::asset::{AssetTree, Folder, FolderId, LeafId, last_segment};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::handlers::{HandlerRegistry, ImageHandler, ImageInsert, deliver_image};
use crate::thumbs::{ThumbUpdate, ThumbnailChain};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// An image already in the document that the engine asked to edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingImage {
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Whether commit inserts a new image or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    #[default]
    Insert,
    Update,
}

impl CommitMode {
    /// Label for the commit control.
    pub fn label(self) -> &'static str {
        match self {
            CommitMode::Insert => "Insert",
            CommitMode::Update => "Update",
        }
    }
}

/// The pending selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    /// Tile the selection came from. `None` for an existing image that is
    /// not in the index.
    pub leaf: Option<LeafId>,
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Intrinsic size, known once the full-size preview has loaded.
    pub natural: Option<Dimensions>,
}

impl ImageSelection {
    /// File name shown next to the preview.
    pub fn name(&self) -> &str {
        last_segment(&self.src)
    }

    pub fn to_insert(&self) -> ImageInsert {
        ImageInsert {
            src: self.src.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Scale `value` along one axis by the ratio of the natural size, rounding
/// to the nearest pixel. `None` when the natural size is degenerate.
fn scale(value: u32, from: u32, to: u32) -> Option<u32> {
    if from == 0 {
        return None;
    }
    Some((f64::from(value) / f64::from(from) * f64::from(to)).round() as u32)
}

#[derive(Debug)]
pub struct ImagePicker {
    config: EditorConfig,
    visible: bool,
    index: LoadState<AssetTree>,
    current: FolderId,
    thumbs: ThumbnailChain,
    selection: Option<ImageSelection>,
    mode: CommitMode,
    sessions: u64,
}

impl ImagePicker {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            visible: false,
            index: LoadState::NotLoaded,
            current: FolderId(0),
            thumbs: ThumbnailChain::default(),
            selection: None,
            mode: CommitMode::Insert,
            sessions: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn index(&self) -> &LoadState<AssetTree> {
        &self.index
    }

    pub fn tree(&self) -> Option<&AssetTree> {
        self.index.loaded()
    }

    pub fn selection(&self) -> Option<&ImageSelection> {
        self.selection.as_ref()
    }

    pub fn mode(&self) -> CommitMode {
        self.mode
    }

    pub fn thumbs(&self) -> &ThumbnailChain {
        &self.thumbs
    }

    /// Whether the commit control is enabled.
    pub fn can_commit(&self) -> bool {
        self.selection.is_some()
    }

    /// Number of completed open/close cycles (commits and cancels).
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Reveal the picker.
    ///
    /// With an existing image, its src and size are pre-filled and commit is
    /// enabled immediately. Returns true when the caller must start loading
    /// the index; that happens once per page session.
    pub fn open(&mut self, existing: Option<ExistingImage>) -> bool {
        self.visible = true;
        match existing {
            Some(existing) => {
                self.mode = CommitMode::Update;
                let leaf = self.tree().and_then(|t| t.leaf_by_url(&existing.src));
                self.selection = Some(ImageSelection {
                    leaf,
                    src: existing.src,
                    width: existing.width,
                    height: existing.height,
                    natural: None,
                });
            }
            None => self.mode = CommitMode::Insert,
        }

        if self.index.is_started() {
            false
        } else {
            self.index = LoadState::Loading;
            true
        }
    }

    /// Install the fetched index and start thumbnails for the root folder.
    pub fn finish_load(&mut self, tree: AssetTree) -> Vec<ThumbUpdate> {
        self.current = tree.root();
        self.thumbs = ThumbnailChain::new(tree.leaf_count());
        if let Some(selection) = self.selection.as_mut() {
            if selection.leaf.is_none() {
                selection.leaf = tree.leaf_by_url(&selection.src);
            }
        }
        self.index = LoadState::Loaded(tree);
        self.advance_thumbs()
    }

    /// Record a failed index fetch. The picker stays empty for the session.
    pub fn fail_load(&mut self) {
        self.index = LoadState::Failed;
    }

    /// Folder whose contents are shown.
    pub fn current_folder(&self) -> Option<FolderId> {
        self.tree().map(|_| self.current)
    }

    /// Target of the "parent folder" affordance; `None` at the root.
    pub fn parent_folder(&self) -> Option<&Folder> {
        let tree = self.tree()?;
        tree.folder(self.current).parent.map(|p| tree.folder(p))
    }

    /// Show exactly the folder at `path` and resume thumbnail loading there.
    pub fn select_folder(&mut self, path: &str) -> Result<Vec<ThumbUpdate>, EditorError> {
        let tree = self.tree().ok_or(EditorError::NotLoaded)?;
        let id = tree
            .folder_by_path(path)
            .ok_or_else(|| EditorError::UnknownFolder(path.to_owned()))?;
        tracing::debug!(path, "showing folder");
        self.current = id;
        Ok(self.advance_thumbs())
    }

    /// Make `leaf` the selection, replacing any previous one.
    ///
    /// Width and height are cleared until the preview reports its natural
    /// size through `preview_loaded`. Selecting the image that is already
    /// selected gets no new preview load, so its known natural size is
    /// reapplied instead.
    pub fn select_leaf(&mut self, leaf: LeafId) -> Result<&ImageSelection, EditorError> {
        let tree = self.tree().ok_or(EditorError::NotLoaded)?;
        let src = tree
            .get_leaf(leaf)
            .ok_or(EditorError::UnknownLeaf(leaf))?
            .url
            .clone();
        tracing::debug!(src = %src, "selected image");

        let natural = self
            .selection
            .as_ref()
            .filter(|previous| previous.src == src)
            .and_then(|previous| previous.natural);
        Ok(&*self.selection.insert(ImageSelection {
            leaf: Some(leaf),
            src,
            width: natural.map(|n| n.width),
            height: natural.map(|n| n.height),
            natural,
        }))
    }

    /// Full-size preview finished loading.
    ///
    /// Fills in width and height from the natural size unless the selection
    /// already carries a size (an existing image being edited).
    pub fn preview_loaded(&mut self, natural: Dimensions) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        selection.natural = Some(natural);
        if selection.width.is_none() && selection.height.is_none() {
            selection.width = Some(natural.width);
            selection.height = Some(natural.height);
        }
    }

    /// Edit the width; height follows the natural aspect ratio when known.
    /// `None` clears the width and leaves the height alone.
    pub fn set_width(&mut self, width: Option<u32>) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        selection.width = width;
        let (Some(width), Some(natural)) = (width, selection.natural) else {
            return;
        };
        if let Some(height) = scale(width, natural.width, natural.height) {
            selection.height = Some(height);
        }
    }

    /// Edit the height; width follows the natural aspect ratio when known.
    /// `None` clears the height and leaves the width alone.
    pub fn set_height(&mut self, height: Option<u32>) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        selection.height = height;
        let (Some(height), Some(natural)) = (height, selection.natural) else {
            return;
        };
        if let Some(width) = scale(height, natural.height, natural.width) {
            selection.width = Some(width);
        }
    }

    /// A tracked thumbnail loaded or failed; continue the chain.
    pub fn thumbnail_settled(&mut self, leaf: LeafId) -> Vec<ThumbUpdate> {
        self.thumbs.settle(leaf);
        self.advance_thumbs()
    }

    /// Hand the selection to the image handler.
    ///
    /// The picker is reset exactly once before the handler runs, so the
    /// outcome of the handler (success, failure or panic) cannot skip it.
    /// Failures are logged and returned; callers at the UI boundary ignore
    /// them.
    pub fn commit(&mut self, handlers: &HandlerRegistry) -> Result<(), EditorError> {
        let insert = self.take_insert();
        Self::deliver(insert, handlers.image_handler().as_ref())
    }

    /// Take the pending insert and reset.
    ///
    /// With `deliver` this splits `commit` in two, so a caller holding the
    /// picker in a `RefCell` can release it before any handler runs.
    pub fn take_insert(&mut self) -> Option<ImageInsert> {
        let insert = self.selection.as_ref().map(ImageSelection::to_insert);
        self.reset();
        insert
    }

    /// Send an insert taken with `take_insert` to `handler`.
    pub fn deliver(
        insert: Option<ImageInsert>,
        handler: Option<&ImageHandler>,
    ) -> Result<(), EditorError> {
        let result = match insert {
            Some(insert) => deliver_image(handler, &insert).map_err(EditorError::from),
            None => Err(EditorError::NoSelection),
        };
        if let Err(e) = &result {
            tracing::error!(error = %e, "image insert failed");
        }
        result
    }

    /// Clear the selection, disable commit and hide the picker.
    pub fn reset(&mut self) {
        self.selection = None;
        self.mode = CommitMode::Insert;
        self.visible = false;
        self.sessions += 1;
    }

    /// Hide without clearing (backdrop click).
    pub fn hide(&mut self) {
        self.visible = false;
    }

    fn advance_thumbs(&mut self) -> Vec<ThumbUpdate> {
        match self.index.loaded() {
            Some(tree) => self.thumbs.advance(tree, self.current, &self.config),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    const SCENARIO: &str = r#"{"path":"/","folders":[{"path":"/a","folders":[],"images":[{"url":"/media/a/x.jpg","thumb":"/t/x.jpg"}]}],"images":[]}"#;

    fn loaded(json: &str) -> (ImagePicker, Vec<ThumbUpdate>) {
        let mut picker = ImagePicker::new(EditorConfig::default());
        assert!(picker.open(None));
        let updates = picker.finish_load(AssetTree::parse(json).unwrap());
        (picker, updates)
    }

    #[test]
    fn test_scenario_folder_with_preset_thumb() {
        let (mut picker, updates) = loaded(SCENARIO);
        let tree = picker.tree().unwrap();

        // Root shows folder "a", no tiles, nothing to fetch.
        assert!(updates.is_empty());
        let root = tree.folder(tree.root());
        assert_eq!(root.folders.len(), 1);
        assert_eq!(tree.folder(root.folders[0]).name, "a");
        assert!(picker.parent_folder().is_none());

        let updates = picker.select_folder("/a").unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].src, "/t/x.jpg");
        assert!(!updates[0].tracked);
        assert_eq!(picker.thumbs().in_flight(), None);
        assert_eq!(picker.parent_folder().map(|f| f.path.as_str()), Some("/"));
    }

    #[test]
    fn test_open_loads_once() {
        let (mut picker, _) = loaded(SCENARIO);
        picker.reset();
        assert!(!picker.open(None));

        let mut failed = ImagePicker::new(EditorConfig::default());
        assert!(failed.open(None));
        failed.fail_load();
        failed.reset();
        assert!(!failed.open(None));
        assert!(failed.tree().is_none());
    }

    #[test]
    fn test_folder_navigation_idempotent() {
        let (mut picker, _) = loaded(SCENARIO);
        let first = picker.select_folder("/a").unwrap();
        let current = picker.current_folder();
        let second = picker.select_folder("/a").unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(picker.current_folder(), current);
    }

    #[test]
    fn test_unknown_folder() {
        let (mut picker, _) = loaded(SCENARIO);
        assert!(matches!(
            picker.select_folder("/nope"),
            Err(EditorError::UnknownFolder(_))
        ));
    }

    #[test]
    fn test_select_before_load() {
        let mut picker = ImagePicker::new(EditorConfig::default());
        assert!(matches!(
            picker.select_leaf(LeafId(0)),
            Err(EditorError::NotLoaded)
        ));
    }

    #[test]
    fn test_aspect_ratio_follows_width() {
        let (mut picker, _) = loaded(SCENARIO);
        let leaf = picker.tree().unwrap().leaf_by_url("/media/a/x.jpg").unwrap();
        picker.select_leaf(leaf).unwrap();
        assert!(picker.can_commit());

        picker.preview_loaded(Dimensions {
            width: 800,
            height: 600,
        });
        let selection = picker.selection().unwrap();
        assert_eq!((selection.width, selection.height), (Some(800), Some(600)));
        assert_eq!(selection.name(), "x.jpg");

        picker.set_width(Some(400));
        let selection = picker.selection().unwrap();
        assert_eq!((selection.width, selection.height), (Some(400), Some(300)));

        picker.set_height(Some(200));
        let selection = picker.selection().unwrap();
        assert_eq!(selection.width, Some(267));
    }

    #[test]
    fn test_reselect_same_tile_keeps_size() {
        let (mut picker, _) = loaded(SCENARIO);
        picker.select_leaf(LeafId(0)).unwrap();
        picker.preview_loaded(Dimensions {
            width: 800,
            height: 600,
        });

        // Same src again: the preview does not reload.
        let selection = picker.select_leaf(LeafId(0)).unwrap();
        assert_eq!((selection.width, selection.height), (Some(800), Some(600)));

        picker.set_width(Some(400));
        let selection = picker.selection().unwrap();
        assert_eq!((selection.width, selection.height), (Some(400), Some(300)));
    }

    #[test]
    fn test_select_other_tile_clears_size() {
        let json = r#"{"path":"/","folders":[],"images":[{"url":"/media/x.jpg"},{"url":"/media/y.jpg"}]}"#;
        let (mut picker, _) = loaded(json);
        picker.select_leaf(LeafId(0)).unwrap();
        picker.preview_loaded(Dimensions {
            width: 800,
            height: 600,
        });

        let selection = picker.select_leaf(LeafId(1)).unwrap();
        assert_eq!(selection.src, "/media/y.jpg");
        assert_eq!((selection.width, selection.height), (None, None));
        assert!(selection.natural.is_none());
    }

    #[test]
    fn test_cleared_width_is_not_committed() {
        let (mut picker, _) = loaded(SCENARIO);
        picker.select_leaf(LeafId(0)).unwrap();
        picker.preview_loaded(Dimensions {
            width: 800,
            height: 600,
        });

        picker.set_width(None);
        let selection = picker.selection().unwrap();
        assert_eq!((selection.width, selection.height), (None, Some(600)));

        let insert = picker.take_insert().unwrap();
        assert_eq!(insert.width, None);
        assert_eq!(insert.height, Some(600));
    }

    #[test]
    fn test_take_insert_releases_picker() {
        let picker = Rc::new(RefCell::new(loaded(SCENARIO).0));
        picker.borrow_mut().select_leaf(LeafId(0)).unwrap();

        let mut handlers = HandlerRegistry::new();
        let reentrant = picker.clone();
        handlers.register_image_handler(move |_| {
            // A handler may reopen the picker while its insert is delivered.
            reentrant.borrow_mut().open(None);
            Ok(())
        });

        let insert = picker.borrow_mut().take_insert();
        assert!(!picker.borrow().can_commit());
        ImagePicker::deliver(insert, handlers.image_handler().as_ref()).unwrap();

        assert!(picker.borrow().is_visible());
        assert_eq!(picker.borrow().sessions(), 1);
    }

    #[test]
    fn test_existing_image_keeps_size() {
        let mut picker = ImagePicker::new(EditorConfig::default());
        picker.open(Some(ExistingImage {
            src: "/media/a/x.jpg".into(),
            width: Some(100),
            height: Some(50),
        }));
        assert!(picker.can_commit());
        assert_eq!(picker.mode(), CommitMode::Update);
        assert_eq!(picker.mode().label(), "Update");

        picker.preview_loaded(Dimensions {
            width: 800,
            height: 600,
        });
        let selection = picker.selection().unwrap();
        assert_eq!((selection.width, selection.height), (Some(100), Some(50)));

        // Leaf is resolved once the index arrives.
        picker.finish_load(AssetTree::parse(SCENARIO).unwrap());
        assert!(picker.selection().unwrap().leaf.is_some());
    }

    #[test]
    fn test_commit_resets_once_on_handler_error() {
        let (mut picker, _) = loaded(SCENARIO);
        let leaf = picker.tree().unwrap().leaf_by_url("/media/a/x.jpg").unwrap();
        picker.select_leaf(leaf).unwrap();

        let mut handlers = HandlerRegistry::new();
        handlers.register_image_handler(|_| Err("engine exploded".into()));

        let before = picker.sessions();
        assert!(matches!(
            picker.commit(&handlers),
            Err(EditorError::Handler(_))
        ));
        assert_eq!(picker.sessions(), before + 1);
        assert!(!picker.is_visible());
        assert!(!picker.can_commit());
        assert_eq!(picker.mode(), CommitMode::Insert);
    }

    #[test]
    fn test_commit_passes_selection() {
        let (mut picker, _) = loaded(SCENARIO);
        let leaf = picker.tree().unwrap().leaf_by_url("/media/a/x.jpg").unwrap();
        picker.select_leaf(leaf).unwrap();
        picker.preview_loaded(Dimensions {
            width: 10,
            height: 20,
        });

        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let mut handlers = HandlerRegistry::new();
        handlers.register_image_handler(move |img| {
            *sink.borrow_mut() = Some(img.clone());
            Ok(())
        });

        picker.commit(&handlers).unwrap();
        assert_eq!(
            seen.borrow().clone(),
            Some(ImageInsert {
                src: "/media/a/x.jpg".into(),
                width: Some(10),
                height: Some(20),
            })
        );
        assert_eq!(picker.sessions(), 1);
    }

    #[test]
    fn test_commit_resets_when_handler_panics() {
        let (mut picker, _) = loaded(SCENARIO);
        let leaf = picker.tree().unwrap().leaf_by_url("/media/a/x.jpg").unwrap();
        picker.select_leaf(leaf).unwrap();

        let mut handlers = HandlerRegistry::new();
        handlers.register_image_handler(|_| panic!("boom"));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = picker.commit(&handlers);
        }));
        assert!(outcome.is_err());
        assert_eq!(picker.sessions(), 1);
        assert!(picker.selection().is_none());
    }

    #[test]
    fn test_commit_without_selection() {
        let (mut picker, _) = loaded(SCENARIO);
        let handlers = HandlerRegistry::new();
        assert!(matches!(
            picker.commit(&handlers),
            Err(EditorError::NoSelection)
        ));
        assert_eq!(picker.sessions(), 1);
    }

    #[test]
    fn test_hide_keeps_selection() {
        let (mut picker, _) = loaded(SCENARIO);
        picker.select_leaf(LeafId(0)).unwrap();
        picker.hide();
        assert!(!picker.is_visible());
        assert!(picker.can_commit());
    }
}
