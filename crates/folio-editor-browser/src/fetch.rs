//! Same-origin index fetches.

use folio_editor_core::{AssetTree, EditorConfig, PageDescriptor};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, Response};

use crate::error::DomError;

/// GET `url` with same-origin credentials and return the body as text.
pub async fn fetch_text(url: &str) -> Result<String, DomError> {
    let window = web_sys::window().ok_or(DomError::NoWindow)?;

    let init = RequestInit::new();
    init.set_method("GET");
    init.set_credentials(RequestCredentials::SameOrigin);
    let request = Request::new_with_str_and_init(url, &init)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(DomError::Http {
            url: url.to_owned(),
            status: response.status(),
        });
    }

    let body = JsFuture::from(response.text()?).await?;
    body.as_string()
        .ok_or_else(|| DomError::Js(format!("{url}: response body is not text")))
}

pub async fn fetch_asset_tree(config: &EditorConfig) -> Result<AssetTree, DomError> {
    let json = fetch_text(&config.images_endpoint).await?;
    let tree = AssetTree::parse(&json)?;
    tracing::debug!(
        folders = tree.folder_count(),
        images = tree.leaf_count(),
        "fetched image index"
    );
    Ok(tree)
}

pub async fn fetch_pages(config: &EditorConfig) -> Result<Vec<PageDescriptor>, DomError> {
    let json = fetch_text(&config.pages_endpoint).await?;
    Ok(PageDescriptor::parse_list(&json)?)
}
