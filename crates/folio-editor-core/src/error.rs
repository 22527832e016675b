//! Error types for editor operations.

use miette::Diagnostic;
use thiserror::Error;

use crate::asset::LeafId;

/// Errors that can occur in the content bridge and the pickers.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum EditorError {
    /// Asset index, page list or configuration was not valid JSON of the expected shape.
    #[error("invalid JSON: {0}")]
    #[diagnostic(code(folio::json))]
    Json(#[from] serde_json::Error),

    /// Folder navigation to a path the index does not contain.
    #[error("no folder with path {0:?}")]
    #[diagnostic(code(folio::unknown_folder))]
    UnknownFolder(String),

    /// Selection of a leaf the index does not contain.
    #[error("no asset with id {0}")]
    #[diagnostic(code(folio::unknown_leaf))]
    UnknownLeaf(LeafId),

    /// Choice of a link target outside the page list.
    #[error("no page at position {0}")]
    #[diagnostic(code(folio::unknown_page))]
    UnknownPage(usize),

    /// Picker operation that needs the index before it has loaded.
    #[error("asset index not loaded")]
    #[diagnostic(code(folio::not_loaded))]
    NotLoaded,

    /// Commit with nothing selected.
    #[error("nothing selected")]
    #[diagnostic(code(folio::no_selection))]
    NoSelection,

    /// A registered insert handler failed.
    #[error(transparent)]
    #[diagnostic(code(folio::handler))]
    Handler(#[from] HandlerError),

    /// The rendering surface or serializer rejected an operation.
    #[error("surface error: {0}")]
    #[diagnostic(code(folio::surface))]
    Surface(String),
}

/// Failure reported by an image or link handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler failed: {0}")]
pub struct HandlerError(pub String);

impl From<&str> for HandlerError {
    fn from(s: &str) -> Self {
        HandlerError(s.to_string())
    }
}

impl From<String> for HandlerError {
    fn from(s: String) -> Self {
        HandlerError(s)
    }
}
