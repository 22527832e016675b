//! The stored text field and its form.

use folio_editor_core::{StoredField, insert_tab};
use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{HtmlFormElement, HtmlTextAreaElement, KeyboardEvent};

/// The textarea holding the persisted markup.
#[derive(Clone)]
pub struct TextField(pub HtmlTextAreaElement);

impl StoredField for TextField {
    fn value(&self) -> String {
        self.0.value()
    }

    fn set_value(&mut self, value: &str) {
        self.0.set_value(value);
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.0.set_hidden(hidden);
    }
}

/// Make Tab insert a tab character instead of moving focus.
///
/// Shift+Tab and Ctrl+Tab keep their usual meaning.
pub fn install_tab_handler(textarea: &HtmlTextAreaElement) -> EventListener {
    let field = textarea.clone();
    EventListener::new_with_options(
        textarea,
        "keydown",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if key.key() != "Tab" || key.shift_key() || key.ctrl_key() {
                return;
            }
            event.prevent_default();

            let start = field.selection_start().ok().flatten().unwrap_or(0);
            let end = field.selection_end().ok().flatten().unwrap_or(start);
            let (value, caret) = insert_tab(&field.value(), start, end);
            field.set_value(&value);
            if let Err(e) = field.set_selection_range(caret, caret) {
                tracing::debug!("failed to place caret after tab: {:?}", e);
            }
        },
    )
}

/// Run `on_submit` synchronously when `form` submits, before its data is
/// read. The submission itself proceeds.
pub fn install_submit_handler(
    form: &HtmlFormElement,
    mut on_submit: impl FnMut() + 'static,
) -> EventListener {
    EventListener::new(form, "submit", move |_| on_submit())
}
