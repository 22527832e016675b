//! Error type for DOM operations.

use folio_editor_core::EditorError;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DomError {
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    /// A required element is absent or has the wrong type.
    #[error("missing element: {0}")]
    Missing(String),

    /// A DOM call threw.
    #[error("JS exception: {0}")]
    Js(String),

    #[error("request to {url} failed with status {status}")]
    Http { url: String, status: u16 },

    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError::Js(
            value
                .as_string()
                .unwrap_or_else(|| format!("{:?}", value)),
        )
    }
}

impl From<DomError> for EditorError {
    fn from(e: DomError) -> Self {
        match e {
            DomError::Editor(inner) => inner,
            other => EditorError::Surface(other.to_string()),
        }
    }
}
