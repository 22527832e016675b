//! Insert handlers registered by the editing engine.
//!
//! The engine registers one image handler and one link handler; the pickers
//! call them on commit. Replaces the engine's global callback slots with an
//! explicit registry owned by the page session.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::HandlerError;

/// Image to insert or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInsert {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Link to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInsert {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Handlers are shared so a caller can clone one out of the registry and
/// release its borrow before calling it. A handler may then register a
/// replacement or reopen a picker without conflicting borrows.
pub type ImageHandler = Rc<dyn Fn(&ImageInsert) -> Result<(), HandlerError>>;
pub type LinkHandler = Rc<dyn Fn(&LinkInsert) -> Result<(), HandlerError>>;

#[derive(Default)]
pub struct HandlerRegistry {
    image: Option<ImageHandler>,
    link: Option<LinkHandler>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("image", &self.image.is_some())
            .field("link", &self.link.is_some())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the image handler, replacing any previous one.
    pub fn register_image_handler(
        &mut self,
        handler: impl Fn(&ImageInsert) -> Result<(), HandlerError> + 'static,
    ) {
        self.image = Some(Rc::new(handler));
    }

    /// Register the link handler, replacing any previous one.
    pub fn register_link_handler(
        &mut self,
        handler: impl Fn(&LinkInsert) -> Result<(), HandlerError> + 'static,
    ) {
        self.link = Some(Rc::new(handler));
    }

    pub fn has_image_handler(&self) -> bool {
        self.image.is_some()
    }

    pub fn has_link_handler(&self) -> bool {
        self.link.is_some()
    }

    pub fn image_handler(&self) -> Option<ImageHandler> {
        self.image.clone()
    }

    pub fn link_handler(&self) -> Option<LinkHandler> {
        self.link.clone()
    }

    pub fn insert_image(&self, image: &ImageInsert) -> Result<(), HandlerError> {
        deliver_image(self.image.as_ref(), image)
    }

    pub fn insert_link(&self, link: &LinkInsert) -> Result<(), HandlerError> {
        deliver_link(self.link.as_ref(), link)
    }
}

/// Call an image handler taken out of a registry.
pub fn deliver_image(
    handler: Option<&ImageHandler>,
    image: &ImageInsert,
) -> Result<(), HandlerError> {
    match handler {
        Some(handler) => handler(image),
        None => Err(HandlerError::from("no image handler registered")),
    }
}

/// Call a link handler taken out of a registry.
pub fn deliver_link(
    handler: Option<&LinkHandler>,
    link: &LinkInsert,
) -> Result<(), HandlerError> {
    match handler {
        Some(handler) => handler(link),
        None => Err(HandlerError::from("no link handler registered")),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_missing_handler_is_error() {
        let registry = HandlerRegistry::new();
        let link = LinkInsert {
            href: "/".into(),
            target: None,
        };
        assert!(registry.insert_link(&link).is_err());
    }

    #[test]
    fn test_reregister_replaces() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();
        registry.register_image_handler(|_| Err("old".into()));

        let sink = seen.clone();
        registry.register_image_handler(move |img| {
            sink.borrow_mut().push(img.src.clone());
            Ok(())
        });

        let image = ImageInsert {
            src: "/media/x.jpg".into(),
            width: Some(4),
            height: Some(3),
        };
        registry.insert_image(&image).unwrap();
        assert_eq!(*seen.borrow(), vec!["/media/x.jpg".to_string()]);
    }

    #[test]
    fn test_handler_can_replace_itself() {
        let registry = Rc::new(RefCell::new(HandlerRegistry::new()));
        let calls = Rc::new(RefCell::new(0));

        let weak = Rc::downgrade(&registry);
        let counter = calls.clone();
        registry.borrow_mut().register_link_handler(move |_| {
            *counter.borrow_mut() += 1;
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().register_link_handler(|_| Err("second".into()));
            }
            Ok(())
        });

        let link = LinkInsert {
            href: "/".into(),
            target: None,
        };
        let handler = registry.borrow().link_handler();
        deliver_link(handler.as_ref(), &link).unwrap();
        assert_eq!(*calls.borrow(), 1);

        let handler = registry.borrow().link_handler();
        assert!(deliver_link(handler.as_ref(), &link).is_err());
    }

    #[test]
    fn test_insert_json_shape() {
        let link = LinkInsert {
            href: "/about/".into(),
            target: Some("_blank".into()),
        };
        assert_eq!(
            serde_json::to_string(&link).unwrap(),
            r#"{"href":"/about/","target":"_blank"}"#
        );
        let image = ImageInsert {
            src: "/media/x.jpg".into(),
            width: None,
            height: None,
        };
        assert_eq!(serde_json::to_string(&image).unwrap(), r#"{"src":"/media/x.jpg"}"#);
    }
}
