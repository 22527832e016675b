//! Content bridge between the stored text field and the live surface.
//!
//! Exactly one side is authoritative at a time. After `initialize` the live
//! surface holds the truth while the user edits; `on_submit` copies it back
//! into the field synchronously so the value is in place before the form
//! data is read. `swap` flips the authority for raw editing.

use std::cell::Cell;

use crate::error::EditorError;
use crate::platform::{ContentSerializer, RenderSurface, StoredField};

/// Which representation currently holds the truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// The text field; the surface is stale or not yet populated.
    Stored,
    /// The live surface; the field is stale until the next serialize.
    Live,
}

pub struct ContentBridge<F, S, Z> {
    field: F,
    surface: S,
    serializer: Z,
    authority: Authority,
}

impl<F, S, Z> ContentBridge<F, S, Z>
where
    F: StoredField,
    S: RenderSurface,
    Z: ContentSerializer<S::Snapshot>,
{
    pub fn new(field: F, surface: S, serializer: Z) -> Self {
        Self {
            field,
            surface,
            serializer,
            authority: Authority::Stored,
        }
    }

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Populate the surface from the stored text. Stored -> Live.
    ///
    /// The surface must be attached and ready.
    pub fn initialize(&mut self) -> Result<&S, EditorError> {
        let text = self.field.value();
        self.surface.populate(&text)?;
        self.authority = Authority::Live;
        tracing::debug!(len = text.len(), "populated surface from stored text");
        Ok(&self.surface)
    }

    /// Serialize the live content.
    ///
    /// A surface still showing its placeholder serializes to the empty
    /// string, meaning "no content entered".
    pub fn serialize(&self) -> Result<String, EditorError> {
        if self.surface.is_placeholder() {
            return Ok(String::new());
        }
        let snapshot = self.surface.snapshot()?;
        self.serializer.serialize(&snapshot)
    }

    /// Form submission: write the live content into the field.
    ///
    /// Does nothing while the field is authoritative (raw view shown, or the
    /// surface never became ready).
    pub fn on_submit(&mut self) -> Result<(), EditorError> {
        if self.authority != Authority::Live {
            return Ok(());
        }
        let text = self.serialize()?;
        self.field.set_value(&text);
        tracing::debug!(len = text.len(), "wrote surface content to field");
        Ok(())
    }

    /// Toggle between the rich surface and raw text editing.
    pub fn swap(&mut self) -> Result<Authority, EditorError> {
        match self.authority {
            Authority::Live => {
                let text = self.serialize()?;
                self.field.set_value(&text);
                self.field.set_hidden(false);
                self.surface.set_hidden(true);
                self.authority = Authority::Stored;
            }
            Authority::Stored => {
                self.initialize()?;
                self.field.set_hidden(true);
                self.surface.set_hidden(false);
            }
        }
        Ok(self.authority)
    }
}

/// Fires at most once.
///
/// Frame surfaces may already be complete when the load listener is
/// attached, so callers both listen for the event and check readiness
/// explicitly; whichever comes first wins.
#[derive(Debug, Default)]
pub struct ReadyGate {
    fired: Cell<bool>,
}

impl ReadyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time only.
    pub fn fire(&self) -> bool {
        !self.fired.replace(true)
    }

    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }
}

/// Insert a tab at the selection of a text field.
///
/// `start` and `end` are UTF-16 offsets as the DOM reports them; the
/// selected text is replaced and the returned caret sits after the tab.
pub fn insert_tab(value: &str, start: u32, end: u32) -> (String, u32) {
    let units: Vec<u16> = value.encode_utf16().collect();
    let len = units.len();
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let start = (start as usize).min(len);
    let end = (end as usize).min(len);

    let mut out = Vec::with_capacity(len + 1);
    out.extend_from_slice(&units[..start]);
    out.push(u16::from(b'\t'));
    out.extend_from_slice(&units[end..]);
    (String::from_utf16_lossy(&out), start as u32 + 1)
}
