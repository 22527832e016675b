//! folio-editor-core: pure Rust logic for the admin content editor.
//!
//! This crate provides:
//! - `ContentBridge` - moves content between the stored form field and the live surface
//! - `AssetTree` - folder/file index built from the asset listing endpoint
//! - `ImagePicker` / `LinkPicker` - picker state machines, framework-free
//! - `ThumbnailChain` - one-at-a-time lazy thumbnail scheduling
//! - `HandlerRegistry` - insert callbacks registered by the editing engine
//!
//! Nothing here touches the DOM. The browser layer renders the state these
//! types expose and feeds DOM events back in.

pub mod asset;
pub mod bridge;
pub mod config;
pub mod error;
pub mod handlers;
pub mod image_picker;
pub mod link_picker;
pub mod platform;
pub mod thumbs;

pub use asset::{AssetIndex, AssetTree, Folder, FolderId, IndexFolder, IndexImage, Leaf, LeafId, PageDescriptor};
pub use bridge::{Authority, ContentBridge, ReadyGate, insert_tab};
pub use config::{EditorConfig, SurfaceKind};
pub use error::{EditorError, HandlerError};
pub use handlers::{
    HandlerRegistry, ImageHandler, ImageInsert, LinkHandler, LinkInsert, deliver_image, deliver_link,
};
pub use image_picker::{CommitMode, Dimensions, ExistingImage, ImagePicker, ImageSelection};
pub use link_picker::{LinkPicker, LinkSelection};
pub use platform::{ContentSerializer, RenderSurface, StoredField};
pub use smol_str::SmolStr;
pub use thumbs::{ThumbUpdate, ThumbnailChain};

/// Load progress of a picker's remote index.
///
/// Loading happens at most once per page session; a failed load leaves the
/// picker unpopulated and is not retried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    #[default]
    NotLoaded,
    Loading,
    Loaded(T),
    Failed,
}

impl<T> LoadState<T> {
    /// The loaded value, if any.
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a fetch has already been started (or finished) this session.
    pub fn is_started(&self) -> bool {
        !matches!(self, LoadState::NotLoaded)
    }
}
