//! WASM bindings for the folio admin editor.
//!
//! Mounts the rich editing surface over the admin form's content field and
//! exposes the image and link pickers to the editing engine.

mod editor;
mod logging;
mod types;

pub use editor::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
