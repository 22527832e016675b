//! Link picker state machine.

use crate::LoadState;
use crate::asset::PageDescriptor;
use crate::error::EditorError;
use crate::handlers::{HandlerRegistry, LinkHandler, LinkInsert, deliver_link};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkSelection {
    /// Index into the page list, if the href came from it.
    pub page: Option<usize>,
    pub href: String,
}

#[derive(Debug, Default)]
pub struct LinkPicker {
    visible: bool,
    pages: LoadState<Vec<PageDescriptor>>,
    selection: Option<LinkSelection>,
    target: String,
    sessions: u64,
}

impl LinkPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn pages(&self) -> &[PageDescriptor] {
        self.pages.loaded().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn selection(&self) -> Option<&LinkSelection> {
        self.selection.as_ref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn can_commit(&self) -> bool {
        self.selection.is_some()
    }

    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Reveal the picker. Returns true when the page list must be fetched.
    pub fn open(&mut self) -> bool {
        self.visible = true;
        if self.pages.is_started() {
            false
        } else {
            self.pages = LoadState::Loading;
            true
        }
    }

    pub fn finish_load(&mut self, pages: Vec<PageDescriptor>) {
        tracing::debug!(count = pages.len(), "loaded link targets");
        self.pages = LoadState::Loaded(pages);
    }

    pub fn fail_load(&mut self) {
        self.pages = LoadState::Failed;
    }

    /// Choose the page at `index` in the list.
    pub fn choose(&mut self, index: usize) -> Result<&LinkSelection, EditorError> {
        let page = self
            .pages()
            .get(index)
            .ok_or(EditorError::UnknownPage(index))?;
        let href = page.url.clone();
        Ok(&*self.selection.insert(LinkSelection {
            page: Some(index),
            href,
        }))
    }

    /// Set the link target attribute (`_blank` etc). Empty means none.
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    /// Reset, then hand the selection to the link handler.
    pub fn commit(&mut self, handlers: &HandlerRegistry) -> Result<(), EditorError> {
        let insert = self.take_insert();
        Self::deliver(insert, handlers.link_handler().as_ref())
    }

    /// Take the pending insert and reset.
    pub fn take_insert(&mut self) -> Option<LinkInsert> {
        let insert = self.selection.as_ref().map(|s| LinkInsert {
            href: s.href.clone(),
            target: Some(self.target.clone()).filter(|t| !t.is_empty()),
        });
        self.reset();
        insert
    }

    pub fn deliver(
        insert: Option<LinkInsert>,
        handler: Option<&LinkHandler>,
    ) -> Result<(), EditorError> {
        let result = match insert {
            Some(insert) => deliver_link(handler, &insert).map_err(EditorError::from),
            None => Err(EditorError::NoSelection),
        };
        if let Err(e) = &result {
            tracing::error!(error = %e, "link insert failed");
        }
        result
    }

    pub fn reset(&mut self) {
        self.selection = None;
        self.target.clear();
        self.visible = false;
        self.sessions += 1;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}
