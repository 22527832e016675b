//! WASM browser tests for folio-editor-js.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use folio_editor_browser::{EditorConfig, SurfaceKind};
use folio_editor_js::FolioEditor;
use web_sys::{Document, HtmlElement, HtmlFormElement, HtmlTextAreaElement};

const IMAGE_AREA: &str = r#"<div></div><form><img><div></div><button type="submit"></button><input name="src"><input name="width"><input name="height"><button type="reset">Cancel</button></form>"#;
const LINK_AREA: &str = r#"<select></select><form><button type="submit"></button><input name="href"><input name="target"><button type="reset">Cancel</button></form>"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn append_div(id: &str, markup: &str) {
    let document = document();
    let element: HtmlElement = document.create_element("div").unwrap().unchecked_into();
    element.set_id(id);
    element.set_inner_html(markup);
    document.body().unwrap().append_child(&element).unwrap();
}

/// An admin form with its content textarea. Picker markup is added by the
/// caller so tests can leave pieces out.
fn page(suffix: &str, content: &str) -> (EditorConfig, HtmlTextAreaElement) {
    let document = document();
    let form: HtmlFormElement = document.create_element("form").unwrap().unchecked_into();
    let textarea: HtmlTextAreaElement =
        document.create_element("textarea").unwrap().unchecked_into();
    textarea.set_id(&format!("content_{suffix}"));
    textarea.set_value(content);
    form.append_child(&textarea).unwrap();
    document.body().unwrap().append_child(&form).unwrap();

    let config = EditorConfig {
        textarea_id: format!("content_{suffix}"),
        surface_id: format!("surface_{suffix}"),
        image_area_id: format!("images_{suffix}"),
        link_area_id: format!("links_{suffix}"),
        background_id: format!("backdrop_{suffix}"),
        surface: SurfaceKind::Container,
        ..EditorConfig::default()
    };
    (config, textarea)
}

fn mount(config: &EditorConfig, on_ready: Option<js_sys::Function>) -> Option<FolioEditor> {
    let config = serde_wasm_bindgen::to_value(config).unwrap();
    let serializer = js_sys::Function::new_with_args("node", "return node.innerHTML;");
    FolioEditor::new(config, serializer, on_ready).ok()
}

#[wasm_bindgen_test]
fn test_mount_replaces_textarea() {
    let (config, textarea) = page("mounted", "<p>hi</p>");
    append_div(&config.image_area_id, IMAGE_AREA);
    append_div(&config.link_area_id, LINK_AREA);
    append_div(&config.background_id, "");

    let on_ready = js_sys::Function::new_with_args("body", "body.dataset.ready = 'yes';");
    let editor = mount(&config, Some(on_ready)).expect("editor mounts");

    assert!(editor.is_ready());
    assert!(textarea.hidden());
    let surface = textarea.previous_element_sibling().unwrap();
    assert_eq!(surface.id(), "surface_mounted");
    assert_eq!(surface.get_attribute("data-ready").as_deref(), Some("yes"));
    assert_eq!(editor.serialize().ok().as_deref(), Some("<p>hi</p>"));
}

#[wasm_bindgen_test]
fn test_missing_picker_leaves_form_untouched() {
    let (config, textarea) = page("nolinks", "<p>hi</p>");
    append_div(&config.image_area_id, IMAGE_AREA);
    append_div(&config.background_id, "");

    assert!(mount(&config, None).is_none());
    assert!(!textarea.hidden());
    assert!(document().get_element_by_id("surface_nolinks").is_none());
}

#[wasm_bindgen_test]
fn test_missing_backdrop_leaves_form_untouched() {
    let (config, textarea) = page("nobackdrop", "");
    append_div(&config.image_area_id, IMAGE_AREA);
    append_div(&config.link_area_id, LINK_AREA);

    assert!(mount(&config, None).is_none());
    assert!(!textarea.hidden());
    assert!(document().get_element_by_id("surface_nobackdrop").is_none());
}
