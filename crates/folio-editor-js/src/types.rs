//! Types exposed to JavaScript via wasm-bindgen.

use folio_editor_core::{ImageInsert, LinkInsert};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Image handed to the registered image handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsImageInsert {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl From<&ImageInsert> for JsImageInsert {
    fn from(image: &ImageInsert) -> Self {
        Self {
            src: image.src.clone(),
            width: image.width,
            height: image.height,
        }
    }
}

/// Link handed to the registered link handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsLinkInsert {
    pub href: String,
    /// Absent when no target was chosen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl From<&LinkInsert> for JsLinkInsert {
    fn from(link: &LinkInsert) -> Self {
        Self {
            href: link.href.clone(),
            target: link.target.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_without_size_omits_fields() {
        let image = ImageInsert {
            src: "/media/x.jpg".into(),
            width: None,
            height: None,
        };
        let js = JsImageInsert::from(&image);
        assert_eq!(serde_json::to_string(&js).unwrap(), r#"{"src":"/media/x.jpg"}"#);
    }

    #[test]
    fn test_link_keeps_target() {
        let link = LinkInsert {
            href: "/about/".into(),
            target: Some("_blank".into()),
        };
        let js = JsLinkInsert::from(&link);
        assert_eq!(js.href, "/about/");
        assert_eq!(js.target.as_deref(), Some("_blank"));
    }
}
