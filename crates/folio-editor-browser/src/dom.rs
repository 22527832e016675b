//! Element lookup and display helpers.

use gloo_events::EventListener;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::error::DomError;

pub fn document() -> Result<Document, DomError> {
    web_sys::window()
        .ok_or(DomError::NoWindow)?
        .document()
        .ok_or(DomError::NoDocument)
}

/// Element by id, cast to `T`.
pub fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, DomError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| DomError::Missing(format!("#{id}")))?
        .dyn_into::<T>()
        .map_err(|_| DomError::Missing(format!("#{id} (unexpected element type)")))
}

/// First descendant matching `selector`, cast to `T`.
pub fn query<T: JsCast>(root: &Element, selector: &str) -> Result<T, DomError> {
    root.query_selector(selector)?
        .ok_or_else(|| DomError::Missing(selector.to_owned()))?
        .dyn_into::<T>()
        .map_err(|_| DomError::Missing(format!("{selector} (unexpected element type)")))
}

/// Show or hide with an inline `display: none`.
pub fn set_displayed(element: &HtmlElement, shown: bool) {
    let style = element.style();
    let result = if shown {
        style.remove_property("display").map(|_| ())
    } else {
        style.set_property("display", "none")
    };
    if let Err(e) = result {
        tracing::warn!("failed to toggle display: {:?}", e);
    }
}

/// `value` of any form control (input, select, textarea).
pub fn control_value(element: &Element) -> String {
    js_sys::Reflect::get(element, &JsValue::from_str("value"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

pub fn set_control_value(element: &Element, value: &str) {
    if let Err(e) = js_sys::Reflect::set(
        element,
        &JsValue::from_str("value"),
        &JsValue::from_str(value),
    ) {
        tracing::warn!("failed to set control value: {:?}", e);
    }
}

/// Run `f` on the next turn of the event loop.
pub fn next_tick(f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(f);
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        0,
    );
    closure.forget();
}

/// The dimmed layer behind an open picker.
#[derive(Clone)]
pub struct Backdrop {
    element: HtmlElement,
}

impl Backdrop {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }

    pub fn show(&self) {
        set_displayed(&self.element, true);
    }

    pub fn hide(&self) {
        set_displayed(&self.element, false);
    }

    /// Run `on_click` when the backdrop itself is clicked.
    pub fn on_click(&self, mut on_click: impl FnMut() + 'static) -> EventListener {
        EventListener::new(&self.element, "click", move |_| on_click())
    }
}
