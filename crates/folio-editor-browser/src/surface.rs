//! The live rendering surface.
//!
//! Either an iframe whose body hosts the editing area (styled by an injected
//! stylesheet) or a plain container element in the admin page itself.
//!
//! A freshly inserted iframe may already be complete by the time a load
//! listener is attached, depending on the browser, so mounting both listens
//! for `load` and checks the ready state explicitly. A `ReadyGate` makes
//! sure attachment runs once whichever path wins.

use std::cell::RefCell;
use std::rc::Rc;

use folio_editor_core::{EditorConfig, EditorError, ReadyGate, RenderSurface, SurfaceKind};
use gloo_events::EventListener;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlIFrameElement, Node};

use crate::error::DomError;

/// Class the engine puts on an untouched editing area.
const PLACEHOLDER_CLASS: &str = "edit_placeholder";

pub struct BrowserSurface {
    kind: SurfaceKind,
    /// Element inserted into the admin page (the iframe or the container).
    host: HtmlElement,
    /// Element whose children are the content.
    body: HtmlElement,
    document: Document,
}

impl BrowserSurface {
    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn body(&self) -> &HtmlElement {
        &self.body
    }

    /// Give keyboard focus back to the editing area.
    pub fn focus(&self) {
        let frame_window = self
            .host
            .dyn_ref::<HtmlIFrameElement>()
            .and_then(HtmlIFrameElement::content_window);
        let result = match frame_window {
            Some(window) => window.focus(),
            None => self.body.focus(),
        };
        if let Err(e) = result {
            tracing::debug!("surface focus failed: {:?}", e);
        }
    }

    /// The engine's content node, when the engine has attached to the body.
    fn engine_content(&self) -> Option<JsValue> {
        let area = js_sys::Reflect::get(&self.body, &JsValue::from_str("editArea")).ok()?;
        if area.is_undefined() || area.is_null() {
            return None;
        }
        let content = js_sys::Reflect::get(&area, &JsValue::from_str("content")).ok()?;
        (!content.is_undefined() && !content.is_null()).then_some(content)
    }

    fn try_populate(&mut self, markup: &str) -> Result<(), DomError> {
        let scratch = self.document.create_element("div")?;
        scratch.set_inner_html(markup);

        self.body.set_inner_html("");
        while let Some(child) = scratch.first_child() {
            self.body.append_child(&child)?;
        }
        self.body.class_list().remove_1(PLACEHOLDER_CLASS)?;
        Ok(())
    }
}

impl RenderSurface for BrowserSurface {
    type Snapshot = Node;

    fn populate(&mut self, markup: &str) -> Result<(), EditorError> {
        self.try_populate(markup).map_err(EditorError::from)
    }

    fn is_placeholder(&self) -> bool {
        match self.engine_content() {
            Some(content) => js_sys::Reflect::get(&content, &JsValue::from_str("_placeholder"))
                .map(|flag| flag.is_truthy())
                .unwrap_or(false),
            None => self.body.class_list().contains(PLACEHOLDER_CLASS),
        }
    }

    fn snapshot(&self) -> Result<Node, EditorError> {
        let content: Node = match self.engine_content().and_then(|c| c.dyn_into::<Node>().ok()) {
            Some(node) => node,
            None => self.body.clone().into(),
        };
        content
            .clone_node_with_deep(true)
            .map_err(|e| EditorError::from(DomError::from(e)))
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.host.set_hidden(hidden);
    }
}

/// Keeps the readiness listener alive until the surface attaches.
pub struct SurfaceMount {
    gate: Rc<ReadyGate>,
    _listener: Option<EventListener>,
}

impl SurfaceMount {
    pub fn is_ready(&self) -> bool {
        self.gate.has_fired()
    }
}

type ReadyCallback = Box<dyn FnOnce(BrowserSurface)>;

/// Insert the surface before `before` and call `on_ready` once it can be
/// populated.
///
/// Container surfaces are ready immediately; `on_ready` runs before this
/// returns.
pub fn mount_surface(
    config: &EditorConfig,
    before: &Element,
    on_ready: impl FnOnce(BrowserSurface) + 'static,
) -> Result<SurfaceMount, DomError> {
    let document = before.owner_document().ok_or(DomError::NoDocument)?;
    let parent = before
        .parent_node()
        .ok_or_else(|| DomError::Missing(format!("parent of #{}", config.textarea_id)))?;
    let gate = Rc::new(ReadyGate::new());

    match config.surface {
        SurfaceKind::Container => {
            let host: HtmlElement = document.create_element("div")?.unchecked_into();
            host.set_id(&config.surface_id);
            host.class_list().add_1(PLACEHOLDER_CLASS)?;
            parent.insert_before(&host, Some(before))?;
            gate.fire();
            tracing::debug!(id = %config.surface_id, "container surface ready");
            on_ready(BrowserSurface {
                kind: SurfaceKind::Container,
                body: host.clone(),
                host,
                document,
            });
            Ok(SurfaceMount {
                gate,
                _listener: None,
            })
        }
        SurfaceKind::Frame => {
            let frame: HtmlIFrameElement = document.create_element("iframe")?.unchecked_into();
            frame.set_id(&config.surface_id);
            parent.insert_before(&frame, Some(before))?;

            let callback: ReadyCallback = Box::new(on_ready);
            let pending = Rc::new(RefCell::new(Some(callback)));
            let attach: Rc<dyn Fn()> = {
                let frame = frame.clone();
                let gate = gate.clone();
                let stylesheet = config.stylesheet.clone();
                Rc::new(move || {
                    if gate.has_fired() {
                        return;
                    }
                    // A failed attempt leaves the gate open for the load event.
                    match attach_frame(&frame, &stylesheet) {
                        Ok(surface) => {
                            gate.fire();
                            let callback = pending.borrow_mut().take();
                            if let Some(callback) = callback {
                                callback(surface);
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "frame surface not attachable yet"),
                    }
                })
            };

            let listener = {
                let attach = attach.clone();
                EventListener::once(&frame, "load", move |_| attach())
            };
            let complete = frame
                .content_document()
                .is_some_and(|d| d.ready_state() == "complete");
            if complete {
                attach();
            }

            Ok(SurfaceMount {
                gate,
                _listener: Some(listener),
            })
        }
    }
}

fn attach_frame(frame: &HtmlIFrameElement, stylesheet: &str) -> Result<BrowserSurface, DomError> {
    let document = frame
        .content_document()
        .ok_or_else(|| DomError::Missing("frame document".into()))?;
    let body = document
        .body()
        .ok_or_else(|| DomError::Missing("frame body".into()))?;
    let head = document
        .head()
        .ok_or_else(|| DomError::Missing("frame head".into()))?;

    let link = document.create_element("link")?;
    link.set_attribute("rel", "stylesheet")?;
    link.set_attribute("href", stylesheet)?;
    link.set_attribute("type", "text/css")?;
    head.append_child(&link)?;

    tracing::debug!(stylesheet, "frame surface ready");
    Ok(BrowserSurface {
        kind: SurfaceKind::Frame,
        host: frame.clone().unchecked_into(),
        body,
        document,
    })
}
