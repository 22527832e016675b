//! Browser DOM layer for the folio admin editor.
//!
//! This crate renders the framework-free state from `folio-editor-core`
//! into the admin page and feeds DOM events back into it. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `surface`: rendering surface (iframe or container) and its readiness
//! - `form`: the stored text field, tab insertion and submit hook
//! - `serializer`: the engine's serializer as a `ContentSerializer`
//! - `fetch`: same-origin JSON fetches for the asset and page indexes
//! - `image_view` / `link_view`: picker dialogs
//! - `dom`: small lookup and display helpers shared by the above
//!
//! # Re-exports
//!
//! This crate re-exports `folio-editor-core` for convenience, so consumers
//! only need to depend on `folio-editor-browser`.

// Re-export core crate
pub use folio_editor_core;
pub use folio_editor_core::*;

pub mod dom;
pub mod error;
pub mod fetch;
pub mod form;
pub mod image_view;
pub mod link_view;
pub mod serializer;
pub mod surface;

pub use dom::Backdrop;
pub use error::DomError;
pub use form::{TextField, install_submit_handler, install_tab_handler};
pub use image_view::{ImagePickerController, existing_image_from_element};
pub use link_view::LinkPickerController;
pub use serializer::JsSerializer;
pub use surface::{BrowserSurface, SurfaceMount, mount_surface};

/// The content bridge as wired in the browser.
pub type BrowserBridge = ContentBridge<TextField, BrowserSurface, JsSerializer>;
