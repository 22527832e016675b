//! Link picker dialog.
//!
//! Expects an area element containing a `select` of pages and a `form` with
//! a submit `button` and controls named `href` and `target`.

use std::cell::RefCell;
use std::rc::Rc;

use folio_editor_core::{EditorConfig, HandlerRegistry, LinkPicker, PageDescriptor};
use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlOptionElement,
    HtmlSelectElement,
};

use crate::dom::{Backdrop, by_id, control_value, next_tick, query, set_control_value, set_displayed};
use crate::error::DomError;
use crate::fetch::fetch_pages;

struct LinkView {
    document: Document,
    area: HtmlElement,
    form: HtmlFormElement,
    list: HtmlSelectElement,
    submit: HtmlButtonElement,
    href_input: Element,
    target_input: Element,
}

impl LinkView {
    fn find(document: &Document, id: &str) -> Result<Self, DomError> {
        let area: HtmlElement = by_id(document, id)?;
        let form: HtmlFormElement = query(&area, "form")?;
        Ok(Self {
            document: document.clone(),
            list: query(&area, "select")?,
            submit: query(&form, "button")?,
            href_input: query(&form, "[name=href]")?,
            target_input: query(&form, "[name=target]")?,
            form,
            area,
        })
    }

    fn fill(&self, pages: &[PageDescriptor]) -> Result<(), DomError> {
        for page in pages {
            let option: HtmlOptionElement = self.document.create_element("option")?.unchecked_into();
            option.class_list().add_1("link")?;
            option.set_value(&page.url);
            option.set_text_content(Some(page.title.as_str()));
            self.list.append_child(&option)?;
        }
        // Nothing is chosen until the user picks.
        self.list.set_selected_index(-1);
        Ok(())
    }

    fn render(&self, state: &LinkPicker) {
        set_displayed(&self.area, state.is_visible());
        let href = state.selection().map(|s| s.href.as_str()).unwrap_or_default();
        set_control_value(&self.href_input, href);
        if state.selection().is_none() {
            self.list.set_selected_index(-1);
            // The target is read back on submit, so a cleared picker must
            // not leave the last one in the control.
            set_control_value(&self.target_input, state.target());
        }
        self.submit.set_disabled(!state.can_commit());
    }
}

struct LinkInner {
    state: RefCell<LinkPicker>,
    view: LinkView,
    config: EditorConfig,
    handlers: Rc<RefCell<HandlerRegistry>>,
    backdrop: Backdrop,
    focus_return: Rc<dyn Fn()>,
    listeners: RefCell<Vec<EventListener>>,
}

/// Wires a `LinkPicker` to its dialog.
#[derive(Clone)]
pub struct LinkPickerController {
    inner: Rc<LinkInner>,
}

impl LinkPickerController {
    pub fn new(
        document: &Document,
        config: EditorConfig,
        handlers: Rc<RefCell<HandlerRegistry>>,
        backdrop: Backdrop,
        focus_return: Rc<dyn Fn()>,
    ) -> Result<Self, DomError> {
        let inner = Rc::new(LinkInner {
            view: LinkView::find(document, &config.link_area_id)?,
            state: RefCell::new(LinkPicker::new()),
            config,
            handlers,
            backdrop,
            focus_return,
            listeners: RefCell::new(Vec::new()),
        });
        install_listeners(&inner);
        render(&inner);
        Ok(Self { inner })
    }

    pub fn open(&self) {
        let inner = &self.inner;
        let must_load = inner.state.borrow_mut().open();
        inner.backdrop.show();
        render(inner);
        let _ = inner.view.list.focus();

        if must_load {
            load(inner);
        }
    }

    /// Hide without clearing the selection.
    pub fn hide(&self) {
        self.inner.state.borrow_mut().hide();
        render(&self.inner);
        self.inner.backdrop.hide();
    }

    pub fn is_visible(&self) -> bool {
        self.inner.state.borrow().is_visible()
    }

    /// Install the page list. `open` does this after the fetch.
    pub fn show_pages(&self, pages: Vec<PageDescriptor>) -> Result<(), DomError> {
        show_pages(&self.inner, pages)
    }
}

fn render(inner: &LinkInner) {
    inner.view.render(&inner.state.borrow());
}

fn close(inner: &LinkInner) {
    render(inner);
    inner.backdrop.hide();
    // The select keeps focus until the current event finishes.
    let focus_return = inner.focus_return.clone();
    next_tick(move || focus_return());
}

fn load(inner: &Rc<LinkInner>) {
    let weak = Rc::downgrade(inner);
    let config = inner.config.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_pages(&config).await;
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if let Err(e) = result.and_then(|pages| show_pages(&inner, pages)) {
            tracing::error!(error = %e, "failed to load page index");
            inner.state.borrow_mut().fail_load();
        }
    });
}

fn show_pages(inner: &LinkInner, pages: Vec<PageDescriptor>) -> Result<(), DomError> {
    if !inner.state.borrow().pages().is_empty() {
        tracing::debug!("link targets already listed");
        return Ok(());
    }
    inner.view.fill(&pages)?;
    inner.state.borrow_mut().finish_load(pages);
    render(inner);
    Ok(())
}

fn install_listeners(inner: &Rc<LinkInner>) {
    let view = &inner.view;
    let mut listeners = inner.listeners.borrow_mut();

    let weak = Rc::downgrade(inner);
    listeners.push(EventListener::new(&view.list, "change", move |_| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let Ok(index) = usize::try_from(inner.view.list.selected_index()) else {
            return;
        };
        let result = inner.state.borrow_mut().choose(index).map(|_| ());
        match result {
            Ok(()) => render(&inner),
            Err(e) => tracing::warn!(error = %e, "page choice ignored"),
        }
    }));

    let weak = Rc::downgrade(inner);
    listeners.push(EventListener::new_with_options(
        &view.form,
        "submit",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            event.prevent_default();
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let insert = {
                let mut state = inner.state.borrow_mut();
                state.set_target(control_value(&inner.view.target_input));
                state.take_insert()
            };
            let handler = inner.handlers.borrow().link_handler();
            close(&inner);
            let _ = LinkPicker::deliver(insert, handler.as_ref());
        },
    ));

    let weak = Rc::downgrade(inner);
    listeners.push(EventListener::new(&view.form, "reset", move |_| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.state.borrow_mut().reset();
        close(&inner);
    }));
}
