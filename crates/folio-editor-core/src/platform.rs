//! Platform abstraction traits for the content bridge.
//!
//! These traits define the interface between the bridge logic and the
//! host page: the stored text field, the live rendering surface and the
//! engine's serializer. The browser implementations live in
//! `folio-editor-browser`; tests use in-memory ones.

use crate::error::EditorError;

/// The form field holding the persisted text.
pub trait StoredField {
    fn value(&self) -> String;

    fn set_value(&mut self, value: &str);

    fn set_hidden(&mut self, hidden: bool);
}

/// The live editable surface.
pub trait RenderSurface {
    /// Deep copy of the live content, detached from the surface.
    type Snapshot;

    /// Parse `markup` and transplant the resulting nodes into the surface,
    /// replacing its content and clearing the placeholder marker.
    fn populate(&mut self, markup: &str) -> Result<(), EditorError>;

    /// Whether the surface only holds the "nothing entered yet" placeholder.
    fn is_placeholder(&self) -> bool;

    fn snapshot(&self) -> Result<Self::Snapshot, EditorError>;

    fn set_hidden(&mut self, hidden: bool);
}

/// The engine's node-tree-to-text serializer.
pub trait ContentSerializer<N> {
    fn serialize(&self, content: &N) -> Result<String, EditorError>;
}
