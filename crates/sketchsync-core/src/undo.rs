//! Local undo/redo history.
//!
//! The stack only records local actions; remote edits never enter it. Each
//! committed action is also handed to the [`SyncProtocol`] for broadcast.

use crate::config::UndoChangePolicy;
use crate::document::Document;
use crate::protocol::{MessageKind, SyncProtocol};
use crate::shapes::{Shape, ShapeId};
use crate::tools::ToolKind;
use thiserror::Error;

/// Errors raised when committing an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Shape {0} is hidden by an undone action")]
    ShapeHidden(ShapeId),
}

/// Kind of a recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoAction {
    New,
    Change,
}

impl UndoAction {
    fn message_kind(self) -> MessageKind {
        match self {
            UndoAction::New => MessageKind::New,
            UndoAction::Change => MessageKind::Change,
        }
    }
}

/// One recorded action.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub action: UndoAction,
    pub shape_id: ShapeId,
    /// Tool that created the shape, for `new` entries.
    pub tool: Option<ToolKind>,
    /// Shape before and after a `change`, kept under
    /// [`UndoChangePolicy::Restore`].
    before: Option<Shape>,
    after: Option<Shape>,
}

/// History of local actions with a pointer separating applied entries from
/// redoable ones.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    entries: Vec<UndoEntry>,
    pointer: usize,
    policy: UndoChangePolicy,
}

impl UndoStack {
    pub fn new(policy: UndoChangePolicy) -> Self {
        Self {
            entries: Vec::new(),
            pointer: 0,
            policy,
        }
    }

    /// Record an action on the shape `shape_id` and broadcast the shape.
    ///
    /// Entries past the pointer are dropped first; shapes created by dropped
    /// `new` entries are removed from the document for good. `before` is the
    /// shape's previous state, used when undoing a `change`.
    pub fn add_change(
        &mut self,
        doc: &mut Document,
        sync: &mut SyncProtocol,
        action: UndoAction,
        shape_id: &str,
        tool: Option<ToolKind>,
        before: Option<Shape>,
    ) -> Result<(), UndoError> {
        // Hidden shapes belong to undone entries and cannot take new actions.
        if doc.is_excluded(shape_id) {
            return Err(UndoError::ShapeHidden(shape_id.to_string()));
        }
        let shape = doc
            .get(shape_id)
            .cloned()
            .ok_or_else(|| UndoError::ShapeNotFound(shape_id.to_string()))?;

        while self.pointer < self.entries.len() {
            if let Some(dropped) = self.entries.pop() {
                if dropped.action == UndoAction::New {
                    doc.remove(&dropped.shape_id);
                    log::debug!("Discarded undone shape {}", dropped.shape_id);
                }
            }
        }

        let keep_snapshots = self.policy == UndoChangePolicy::Restore && action == UndoAction::Change;
        sync.send_shape(action.message_kind(), &shape);
        self.entries.push(UndoEntry {
            action,
            shape_id: shape_id.to_string(),
            tool,
            before: if keep_snapshots { before } else { None },
            after: if keep_snapshots { Some(shape) } else { None },
        });
        self.pointer += 1;
        log::debug!("Recorded {:?} of {} ({} entries)", action, shape_id, self.entries.len());
        Ok(())
    }

    /// Step back one entry. Returns false if there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document, sync: &mut SyncProtocol) -> bool {
        if self.pointer == 0 {
            return false;
        }
        self.pointer -= 1;
        let entry = &self.entries[self.pointer];

        match entry.action {
            UndoAction::New => {
                doc.set_excluded(&entry.shape_id, true);
                sync.send(MessageKind::Delete, entry.shape_id.clone());
                log::debug!("Undo: hid {}", entry.shape_id);
            }
            UndoAction::Change => match (&self.policy, &entry.before) {
                (UndoChangePolicy::Restore, Some(before)) => {
                    if doc.replace(before.clone()).is_some() {
                        sync.send_shape(MessageKind::Change, before);
                        log::debug!("Undo: restored previous state of {}", entry.shape_id);
                    }
                }
                _ => log::debug!("Undo: change of {} has no inverse", entry.shape_id),
            },
        }
        true
    }

    /// Step forward one entry. Returns false if there is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document, sync: &mut SyncProtocol) -> bool {
        if self.pointer == self.entries.len() {
            return false;
        }
        let entry = &self.entries[self.pointer];

        match entry.action {
            UndoAction::New => {
                if doc.set_excluded(&entry.shape_id, false) {
                    if let Some(shape) = doc.get(&entry.shape_id) {
                        sync.send_shape(MessageKind::New, shape);
                    }
                    log::debug!("Redo: included {}", entry.shape_id);
                }
            }
            UndoAction::Change => {
                if let Some(after) = &entry.after {
                    if doc.replace(after.clone()).is_some() {
                        sync.send_shape(MessageKind::Change, after);
                        log::debug!("Redo: re-applied change of {}", entry.shape_id);
                    }
                }
            }
        }
        self.pointer += 1;
        true
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    /// Number of recorded entries, applied or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Boundary between applied and redoable entries.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer < self.entries.len()
    }

    pub fn policy(&self) -> UndoChangePolicy {
        self.policy
    }
}
