//! Editor configuration.
//!
//! Every field has a default matching the admin screen's URL and element
//! conventions, so pages only need to override what differs.

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Kind of rendering surface hosting the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Isolated iframe; content is populated once the frame reports ready.
    #[default]
    Frame,
    /// In-page container element; ready immediately.
    Container,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Asset index endpoint (folder tree or flat image list).
    pub images_endpoint: String,
    /// Link target endpoint returning `[{url, title}]`.
    pub pages_endpoint: String,
    /// On-demand thumbnail endpoint.
    pub thumbnail_endpoint: String,
    /// Query parameter carrying the file path for the thumbnail endpoint.
    pub thumbnail_param: String,
    /// URL prefix stripped from asset URLs to get the thumbnail file argument.
    pub media_prefix: String,
    /// Stylesheet injected into frame surfaces.
    pub stylesheet: String,
    pub textarea_id: String,
    pub surface_id: String,
    pub image_area_id: String,
    pub link_area_id: String,
    pub background_id: String,
    pub surface: SurfaceKind,
    /// `tracing-subscriber` filter directives.
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            images_endpoint: "/admin/content/all_images".to_owned(),
            pages_endpoint: "/admin/content/all_pages".to_owned(),
            thumbnail_endpoint: "/admin/content/get_thumbnail".to_owned(),
            thumbnail_param: "f".to_owned(),
            media_prefix: "/media/".to_owned(),
            stylesheet: "/static/admin/content/iframe.css".to_owned(),
            textarea_id: "id_content".to_owned(),
            surface_id: "richarea".to_owned(),
            image_area_id: "imagearea".to_owned(),
            link_area_id: "linkarea".to_owned(),
            background_id: "pickerbackground".to_owned(),
            surface: SurfaceKind::Frame,
            log_filter: "debug".to_owned(),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration object, filling absent fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Thumbnail request URL for an asset.
    ///
    /// The file argument is the asset URL with `media_prefix` stripped; URLs
    /// outside the prefix are passed through whole.
    pub fn thumbnail_url(&self, asset_url: &str) -> String {
        let file = asset_url
            .strip_prefix(self.media_prefix.as_str())
            .unwrap_or(asset_url);
        format!(
            "{}?{}={}",
            self.thumbnail_endpoint,
            self.thumbnail_param,
            urlencoding::encode(file)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config =
            EditorConfig::from_json(r#"{"imagesEndpoint": "/admin/all_images", "surface": "container"}"#)
                .unwrap();
        assert_eq!(config.images_endpoint, "/admin/all_images");
        assert_eq!(config.surface, SurfaceKind::Container);
        assert_eq!(config.pages_endpoint, "/admin/content/all_pages");
        assert_eq!(config.textarea_id, "id_content");
    }

    #[test]
    fn test_bad_config_is_error() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"surface": "window"}"#),
            Err(EditorError::Json(_))
        ));
    }

    #[test]
    fn test_thumbnail_url_strips_media_prefix() {
        let config = EditorConfig::default();
        assert_eq!(
            config.thumbnail_url("/media/a/my photo.jpg"),
            "/admin/content/get_thumbnail?f=a%2Fmy%20photo.jpg"
        );
    }

    #[test]
    fn test_thumbnail_url_outside_prefix() {
        let config = EditorConfig::default();
        assert_eq!(
            config.thumbnail_url("/uploads/x.png"),
            "/admin/content/get_thumbnail?f=%2Fuploads%2Fx.png"
        );
    }
}
