//! Image picker dialog.
//!
//! Expects an area element containing a tile container `div` followed by a
//! `form`. The form holds a preview `img`, a name label `div`, a submit
//! `button` and inputs named `src`, `width` and `height`. The tile
//! container is filled from the fetched index: one `div.folderinner` per
//! folder, each with folder links (`a.folder`) and image tiles
//! (`div.image`), only the current one shown.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_editor_core::{
    AssetTree, Dimensions, EditorConfig, ExistingImage, FolderId, HandlerRegistry, ImagePicker,
    LeafId, ThumbUpdate,
};
use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlImageElement,
    HtmlInputElement,
};

use crate::dom::{Backdrop, by_id, query, set_displayed};
use crate::error::DomError;
use crate::fetch::fetch_asset_tree;

/// Read src, width and height attributes off an image in the document.
pub fn existing_image_from_element(element: &Element) -> ExistingImage {
    let dimension = |name: &str| {
        element
            .get_attribute(name)
            .and_then(|v| v.trim().parse::<u32>().ok())
    };
    ExistingImage {
        src: element.get_attribute("src").unwrap_or_default(),
        width: dimension("width"),
        height: dimension("height"),
    }
}

/// Which size input the user is typing in; render leaves it alone.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SizeField {
    Width,
    Height,
}

/// Tile elements built from the index, addressed by folder and leaf id.
struct Tiles {
    groups: Vec<Option<HtmlElement>>,
    tiles: Vec<Option<HtmlElement>>,
    images: Vec<Option<HtmlImageElement>>,
}

impl Tiles {
    fn build(document: &Document, container: &Element, tree: &AssetTree) -> Result<Self, DomError> {
        let mut groups = vec![None; tree.folder_count()];
        let mut tiles = vec![None; tree.leaf_count()];
        let mut images = vec![None; tree.leaf_count()];

        for (id, folder) in tree.folders() {
            let group: HtmlElement = document.create_element("div")?.unchecked_into();
            group.class_list().add_1("folderinner")?;
            group.set_attribute("data-dirname", &folder.path)?;
            group.set_hidden(id != tree.root());

            if let Some(parent) = folder.parent {
                let link = folder_link(document, &tree.folder(parent).path, "Parent folder")?;
                group.append_child(&link)?;
            }
            for &child in &folder.folders {
                let child = tree.folder(child);
                let link = folder_link(document, &child.path, &child.name)?;
                group.append_child(&link)?;
            }
            for &leaf_id in &folder.leaves {
                let leaf = tree.leaf(leaf_id);
                let tile: HtmlElement = document.create_element("div")?.unchecked_into();
                tile.class_list().add_1("image")?;
                tile.set_attribute("data-src", &leaf.url)?;
                tile.set_attribute("data-leaf", &leaf_id.to_string())?;
                tile.set_title(&leaf.title);
                let img: HtmlImageElement = document.create_element("img")?.unchecked_into();
                tile.append_child(&img)?;
                group.append_child(&tile)?;

                tiles[leaf_id.0] = Some(tile);
                images[leaf_id.0] = Some(img);
            }

            container.append_child(&group)?;
            groups[id.0] = Some(group);
        }

        Ok(Self {
            groups,
            tiles,
            images,
        })
    }
}

/// `<div><a href="#" class="folder" data-path=".."><span class="folder-icon"></span> label</a></div>`
fn folder_link(document: &Document, path: &str, label: &str) -> Result<Element, DomError> {
    let wrapper = document.create_element("div")?;
    let link = document.create_element("a")?;
    link.set_attribute("href", "#")?;
    link.class_list().add_1("folder")?;
    link.set_attribute("data-path", path)?;
    let icon = document.create_element("span")?;
    icon.class_list().add_1("folder-icon")?;
    link.append_child(&icon)?;
    link.append_child(&document.create_text_node(&format!(" {label}")))?;
    wrapper.append_child(&link)?;
    Ok(wrapper)
}

struct ImageView {
    document: Document,
    area: HtmlElement,
    container: HtmlElement,
    form: HtmlFormElement,
    preview: HtmlImageElement,
    name_label: HtmlElement,
    submit: HtmlButtonElement,
    src_input: HtmlInputElement,
    width_input: HtmlInputElement,
    height_input: HtmlInputElement,
    tiles: RefCell<Option<Tiles>>,
}

impl ImageView {
    fn find(document: &Document, id: &str) -> Result<Self, DomError> {
        let area: HtmlElement = by_id(document, id)?;
        let form: HtmlFormElement = query(&area, "form")?;
        Ok(Self {
            document: document.clone(),
            container: query(&area, "div")?,
            preview: query(&form, "img")?,
            name_label: query(&form, "div")?,
            submit: query(&form, "button")?,
            src_input: query(&form, "[name=src]")?,
            width_input: query(&form, "[name=width]")?,
            height_input: query(&form, "[name=height]")?,
            form,
            area,
            tiles: RefCell::new(None),
        })
    }

    fn image(&self, leaf: LeafId) -> Option<HtmlImageElement> {
        self.tiles
            .borrow()
            .as_ref()
            .and_then(|t| t.images.get(leaf.0).cloned().flatten())
    }

    fn render(&self, state: &ImagePicker, editing: Option<SizeField>) {
        set_displayed(&self.area, state.is_visible());

        let selection = state.selection();
        if let Some(tiles) = self.tiles.borrow().as_ref() {
            let current = state.current_folder();
            for (i, group) in tiles.groups.iter().enumerate() {
                if let Some(group) = group {
                    group.set_hidden(current != Some(FolderId(i)));
                }
            }
            let selected = selection.and_then(|s| s.leaf);
            for (i, tile) in tiles.tiles.iter().enumerate() {
                if let Some(tile) = tile {
                    let _ = tile
                        .class_list()
                        .toggle_with_force("selected", selected == Some(LeafId(i)));
                }
            }
        }

        let src = selection.map(|s| s.src.as_str());
        if self.preview.get_attribute("src").as_deref() != src {
            match src {
                Some(src) => self.preview.set_src(src),
                None => {
                    let _ = self.preview.remove_attribute("src");
                }
            }
        }
        self.name_label
            .set_text_content(selection.map(|s| s.name()));
        self.src_input.set_value(src.unwrap_or_default());

        let size = |v: Option<u32>| v.map(|v| v.to_string()).unwrap_or_default();
        if editing != Some(SizeField::Width) {
            self.width_input
                .set_value(&size(selection.and_then(|s| s.width)));
        }
        if editing != Some(SizeField::Height) {
            self.height_input
                .set_value(&size(selection.and_then(|s| s.height)));
        }

        self.submit.set_disabled(!state.can_commit());
        self.submit.set_text_content(Some(state.mode().label()));
    }
}

struct ImageInner {
    state: RefCell<ImagePicker>,
    view: ImageView,
    handlers: Rc<RefCell<HandlerRegistry>>,
    backdrop: Backdrop,
    focus_return: Rc<dyn Fn()>,
    listeners: RefCell<Vec<EventListener>>,
}

/// Wires an `ImagePicker` to its dialog.
#[derive(Clone)]
pub struct ImagePickerController {
    inner: Rc<ImageInner>,
}

impl ImagePickerController {
    pub fn new(
        document: &Document,
        config: EditorConfig,
        handlers: Rc<RefCell<HandlerRegistry>>,
        backdrop: Backdrop,
        focus_return: Rc<dyn Fn()>,
    ) -> Result<Self, DomError> {
        let view = ImageView::find(document, &config.image_area_id)?;
        let inner = Rc::new(ImageInner {
            state: RefCell::new(ImagePicker::new(config)),
            view,
            handlers,
            backdrop,
            focus_return,
            listeners: RefCell::new(Vec::new()),
        });
        install_listeners(&inner);
        render(&inner, None);
        Ok(Self { inner })
    }

    /// Show the picker, optionally editing an image already in the content.
    pub fn open(&self, existing: Option<&Element>) {
        let inner = &self.inner;
        let must_load = inner
            .state
            .borrow_mut()
            .open(existing.map(existing_image_from_element));
        inner.backdrop.show();
        render(inner, None);
        let _ = inner.view.container.focus();

        if must_load {
            load(inner);
        }
    }

    /// Hide without clearing the selection.
    pub fn hide(&self) {
        self.inner.state.borrow_mut().hide();
        render(&self.inner, None);
        self.inner.backdrop.hide();
    }

    pub fn is_visible(&self) -> bool {
        self.inner.state.borrow().is_visible()
    }

    /// Install an index and build its tiles. `open` does this after the
    /// fetch; an index installed beforehand means no fetch happens.
    pub fn show_tree(&self, tree: AssetTree) -> Result<(), DomError> {
        show_tree(&self.inner, tree)
    }
}

fn render(inner: &ImageInner, editing: Option<SizeField>) {
    inner.view.render(&inner.state.borrow(), editing);
}

fn close(inner: &ImageInner) {
    render(inner, None);
    inner.backdrop.hide();
    (inner.focus_return)();
}

fn load(inner: &Rc<ImageInner>) {
    let weak = Rc::downgrade(inner);
    let config = inner.state.borrow().config().clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_asset_tree(&config).await;
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if let Err(e) = result.and_then(|tree| show_tree(&inner, tree)) {
            tracing::error!(error = %e, "failed to load image index");
            inner.state.borrow_mut().fail_load();
        }
    });
}

fn show_tree(inner: &Rc<ImageInner>, tree: AssetTree) -> Result<(), DomError> {
    let view = &inner.view;
    if view.tiles.borrow().is_some() {
        tracing::debug!("image tiles already built");
        return Ok(());
    }
    let tiles = Tiles::build(&view.document, &view.container, &tree)?;
    *view.tiles.borrow_mut() = Some(tiles);

    let updates = inner.state.borrow_mut().finish_load(tree);
    render(inner, None);
    apply_thumbs(inner, updates);
    Ok(())
}

/// Assign tile sources. Tracked requests report back when they settle so
/// the chain can move on, whether the thumbnail loaded or failed.
fn apply_thumbs(inner: &Rc<ImageInner>, updates: Vec<ThumbUpdate>) {
    for update in updates {
        let Some(img) = inner.view.image(update.leaf) else {
            continue;
        };
        if update.tracked {
            let mut listeners = inner.listeners.borrow_mut();
            for event in ["load", "error"] {
                let weak = Rc::downgrade(inner);
                let leaf = update.leaf;
                listeners.push(EventListener::once(&img, event, move |_| {
                    thumbnail_settled(&weak, leaf);
                }));
            }
        }
        img.set_src(&update.src);
    }
}

fn thumbnail_settled(weak: &Weak<ImageInner>, leaf: LeafId) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let updates = inner.state.borrow_mut().thumbnail_settled(leaf);
    apply_thumbs(&inner, updates);
}

fn install_listeners(inner: &Rc<ImageInner>) {
    let view = &inner.view;
    let mut listeners = inner.listeners.borrow_mut();

    let weak = Rc::downgrade(inner);
    listeners.push(EventListener::new_with_options(
        &view.area,
        "click",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };

            if let Ok(Some(link)) = target.closest("a.folder") {
                event.prevent_default();
                let path = link.get_attribute("data-path").unwrap_or_default();
                let result = inner.state.borrow_mut().select_folder(&path);
                match result {
                    Ok(updates) => {
                        render(&inner, None);
                        apply_thumbs(&inner, updates);
                    }
                    Err(e) => tracing::warn!(error = %e, "folder link ignored"),
                }
            } else if let Ok(Some(tile)) = target.closest("div.image") {
                let Some(leaf) = tile
                    .get_attribute("data-leaf")
                    .and_then(|v| v.parse().ok())
                    .map(LeafId)
                else {
                    return;
                };
                let result = inner.state.borrow_mut().select_leaf(leaf).map(|_| ());
                match result {
                    Ok(()) => render(&inner, None),
                    Err(e) => tracing::warn!(error = %e, "tile click ignored"),
                }
            }
        },
    ));

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
            let insert = inner.state.borrow_mut().take_insert();
            let handler = inner.handlers.borrow().image_handler();
            close(&inner);
            // Failures are logged by the picker.
            let _ = ImagePicker::deliver(insert, handler.as_ref());
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

    let weak = Rc::downgrade(inner);
    listeners.push(EventListener::new(&view.preview, "load", move |_| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let preview = &inner.view.preview;
        let natural = Dimensions {
            width: preview.natural_width(),
            height: preview.natural_height(),
        };
        inner.state.borrow_mut().preview_loaded(natural);
        render(&inner, None);
    }));

    for field in [SizeField::Width, SizeField::Height] {
        let input = match field {
            SizeField::Width => &view.width_input,
            SizeField::Height => &view.height_input,
        };
        let weak = Rc::downgrade(inner);
        let source = input.clone();
        listeners.push(EventListener::new(input, "input", move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let value = match source.value().trim() {
                "" => None,
                text => match text.parse::<u32>() {
                    Ok(value) => Some(value),
                    Err(_) => return,
                },
            };
            {
                let mut state = inner.state.borrow_mut();
                match field {
                    SizeField::Width => state.set_width(value),
                    SizeField::Height => state.set_height(value),
                }
            }
            render(&inner, Some(field));
        }));
    }
}
