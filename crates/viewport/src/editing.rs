//! Which cell editor, if any, currently owns text input.
//!
//! One coordinator per open table. Panes consult it before intercepting
//! pan gestures, and editors register with it when they gain focus.

use std::fmt;

use notegrid_core::StableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl EditorId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A cell editor: identity plus the cell it edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorHandle {
    pub id: EditorId,
    pub cell: StableId,
}

impl fmt::Display for EditorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor#{}@{}", self.id.0, self.cell)
    }
}

/// Result of `begin_editing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginEditing {
    Started,
    AlreadyEditing,
    /// Another editor was active; the caller must finish it.
    Replaced(EditorHandle),
}

type StateListener = Box<dyn FnMut(bool)>;

#[derive(Default)]
pub struct EditingCoordinator {
    current: Option<EditorHandle>,
    next_id: u64,
    listener: Option<StateListener>,
}

impl fmt::Debug for EditingCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditingCoordinator")
            .field("current", &self.current)
            .field("next_id", &self.next_id)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl EditingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a handle for an editor bound to `cell`.
    pub fn allocate_editor(&mut self, cell: StableId) -> EditorHandle {
        let id = EditorId(self.next_id);
        self.next_id += 1;
        EditorHandle { id, cell }
    }

    pub fn begin_editing(&mut self, handle: EditorHandle) -> BeginEditing {
        match self.current.replace(handle) {
            Some(prev) if prev.id == handle.id => BeginEditing::AlreadyEditing,
            Some(prev) => {
                log::debug!("{handle} replaces {prev}");
                BeginEditing::Replaced(prev)
            }
            None => {
                self.notify(true);
                BeginEditing::Started
            }
        }
    }

    /// Clears editing state only if `handle` is the current editor, so
    /// a late call from a replaced editor is ignored.
    pub fn end_editing(&mut self, handle: EditorHandle) -> bool {
        match self.current {
            Some(current) if current.id == handle.id => {
                self.current = None;
                self.notify(false);
                true
            }
            _ => false,
        }
    }

    /// End whatever is being edited; returns the editor to finish.
    pub fn force_end(&mut self) -> Option<EditorHandle> {
        let prev = self.current.take();
        if prev.is_some() {
            self.notify(false);
        }
        prev
    }

    pub fn is_editing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<EditorHandle> {
        self.current
    }

    pub fn is_current_cell(&self, cell: StableId) -> bool {
        self.current.is_some_and(|h| h.cell == cell)
    }

    pub fn current_identifier(&self) -> Option<String> {
        self.current.map(|h| h.cell.to_string())
    }

    pub fn set_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    fn notify(&mut self, editing: bool) {
        if let Some(listener) = self.listener.as_mut() {
            listener(editing);
        }
    }
}
