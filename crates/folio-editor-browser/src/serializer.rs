//! The editing engine's serializer, seen from Rust.

use folio_editor_core::{ContentSerializer, EditorError};
use wasm_bindgen::JsValue;
use web_sys::Node;

/// Wraps a JS function `(node) => string`.
pub struct JsSerializer {
    function: js_sys::Function,
}

impl JsSerializer {
    pub fn new(function: js_sys::Function) -> Self {
        Self { function }
    }
}

impl ContentSerializer<Node> for JsSerializer {
    fn serialize(&self, content: &Node) -> Result<String, EditorError> {
        let value = self
            .function
            .call1(&JsValue::NULL, content)
            .map_err(|e| EditorError::Surface(format!("serializer threw: {:?}", e)))?;
        value
            .as_string()
            .ok_or_else(|| EditorError::Surface("serializer returned a non-string".into()))
    }
}
