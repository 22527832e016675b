//! FolioEditor - the admin page's editor session for JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement, HtmlTextAreaElement};

use folio_editor_browser::dom::{self, by_id};
use folio_editor_browser::{
    Authority, Backdrop, BrowserBridge, ContentBridge, DomError, EditorConfig, HandlerError,
    HandlerRegistry, ImagePickerController, JsSerializer, LinkPickerController, SurfaceMount,
    TextField, install_submit_handler, install_tab_handler, mount_surface,
};

use crate::logging::init_tracing;
use crate::types::{JsImageInsert, JsLinkInsert};

type SharedBridge = Rc<RefCell<Option<BrowserBridge>>>;

/// One editing session over the admin form.
///
/// Hides the content textarea, mounts the rich surface in front of it and
/// keeps the textarea up to date on form submission. The editing engine
/// registers its insert handlers here and opens the pickers through
/// `imageCallback` and `linkCallback`.
#[wasm_bindgen]
pub struct FolioEditor {
    bridge: SharedBridge,
    handlers: Rc<RefCell<HandlerRegistry>>,
    image: ImagePickerController,
    link: LinkPickerController,
    _mount: SurfaceMount,
    _listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl FolioEditor {
    /// Mount the editor.
    ///
    /// `config` may be undefined or a partial configuration object.
    /// `serializer` turns a snapshot of the live content into markup.
    /// `onReady` receives the surface body once it has been populated,
    /// which is where the engine attaches itself.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        serializer: js_sys::Function,
        on_ready: Option<js_sys::Function>,
    ) -> Result<FolioEditor, JsError> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };
        init_tracing(&config.log_filter);

        mount_editor(config, serializer, on_ready).map_err(|e| {
            tracing::error!(error = %e, "failed to mount editor");
            JsError::new(&e.to_string())
        })
    }

    /// Register the function that inserts or updates an image.
    ///
    /// Called with `{src, width?, height?}` when the image picker commits.
    #[wasm_bindgen(js_name = registerImageHandler)]
    pub fn register_image_handler(&self, handler: js_sys::Function) {
        self.handlers
            .borrow_mut()
            .register_image_handler(move |image| {
                let value = serde_wasm_bindgen::to_value(&JsImageInsert::from(image))
                    .map_err(|e| HandlerError::from(e.to_string()))?;
                call_handler(&handler, &value)
            });
    }

    /// Register the function that inserts a link.
    ///
    /// Called with `{href, target?}` when the link picker commits.
    #[wasm_bindgen(js_name = registerLinkHandler)]
    pub fn register_link_handler(&self, handler: js_sys::Function) {
        self.handlers
            .borrow_mut()
            .register_link_handler(move |link| {
                let value = serde_wasm_bindgen::to_value(&JsLinkInsert::from(link))
                    .map_err(|e| HandlerError::from(e.to_string()))?;
                call_handler(&handler, &value)
            });
    }

    /// Open the image picker, optionally to edit an image already in the
    /// content.
    #[wasm_bindgen(js_name = imageCallback)]
    pub fn image_callback(&self, existing: Option<Element>) {
        self.image.open(existing.as_ref());
    }

    /// Open the link picker.
    #[wasm_bindgen(js_name = linkCallback)]
    pub fn link_callback(&self) {
        self.link.open();
    }

    /// Toggle between the rich surface and the raw textarea.
    ///
    /// Returns true when the rich surface is shown afterwards.
    pub fn swap(&self) -> Result<bool, JsError> {
        let mut bridge = self.bridge.borrow_mut();
        let bridge = bridge
            .as_mut()
            .ok_or_else(|| JsError::new("Surface is not ready"))?;
        let authority = bridge.swap().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(authority == Authority::Live)
    }

    /// Current content as markup, without touching the textarea.
    pub fn serialize(&self) -> Result<String, JsError> {
        let bridge = self.bridge.borrow();
        let bridge = bridge
            .as_ref()
            .ok_or_else(|| JsError::new("Surface is not ready"))?;
        bridge.serialize().map_err(|e| JsError::new(&e.to_string()))
    }

    /// Whether the surface has been populated.
    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.bridge.borrow().is_some()
    }
}

fn mount_editor(
    config: EditorConfig,
    serializer: js_sys::Function,
    on_ready: Option<js_sys::Function>,
) -> Result<FolioEditor, DomError> {
    // Every lookup that can fail happens before the page is touched, so an
    // error leaves the plain textarea form working.
    let document = dom::document()?;
    let textarea: HtmlTextAreaElement = by_id(&document, &config.textarea_id)?;
    let form = textarea
        .form()
        .ok_or_else(|| DomError::Missing(format!("form of #{}", config.textarea_id)))?;
    let backdrop = Backdrop::new(by_id::<HtmlElement>(&document, &config.background_id)?);

    let bridge: SharedBridge = Rc::default();
    let focus_bridge = bridge.clone();
    let focus_return: Rc<dyn Fn()> = Rc::new(move || {
        if let Some(bridge) = focus_bridge.borrow().as_ref() {
            bridge.surface().focus();
        }
    });

    let handlers = Rc::new(RefCell::new(HandlerRegistry::new()));
    let image = ImagePickerController::new(
        &document,
        config.clone(),
        handlers.clone(),
        backdrop.clone(),
        focus_return.clone(),
    )?;
    let link = LinkPickerController::new(
        &document,
        config.clone(),
        handlers.clone(),
        backdrop.clone(),
        focus_return,
    )?;

    let mount = {
        let bridge = bridge.clone();
        let field = TextField(textarea.clone());
        mount_surface(&config, &textarea, move |surface| {
            let mut ready = ContentBridge::new(field, surface, JsSerializer::new(serializer));
            if let Err(e) = ready.initialize() {
                tracing::error!(error = %e, "failed to populate surface");
            }
            let body = ready.surface().body().clone();
            *bridge.borrow_mut() = Some(ready);

            if let Some(on_ready) = on_ready {
                if let Err(e) = on_ready.call1(&JsValue::NULL, &body) {
                    tracing::error!("ready callback threw: {:?}", e);
                }
            }
        })?
    };
    textarea.set_hidden(true);

    let mut listeners = vec![install_tab_handler(&textarea)];
    let submit_bridge = bridge.clone();
    listeners.push(install_submit_handler(&form, move || {
        if let Some(bridge) = submit_bridge.borrow_mut().as_mut() {
            if let Err(e) = bridge.on_submit() {
                tracing::error!(error = %e, "failed to write content before submit");
            }
        }
    }));
    listeners.push(backdrop.on_click({
        let image = image.clone();
        let link = link.clone();
        move || {
            image.hide();
            link.hide();
        }
    }));

    tracing::info!(surface = ?config.surface, "editor mounted");
    Ok(FolioEditor {
        bridge,
        handlers,
        image,
        link,
        _mount: mount,
        _listeners: listeners,
    })
}

fn call_handler(handler: &js_sys::Function, value: &JsValue) -> Result<(), HandlerError> {
    handler
        .call1(&JsValue::NULL, value)
        .map(|_| ())
        .map_err(|e| HandlerError::from(format!("{:?}", e)))
}
