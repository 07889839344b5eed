//! Undo/redo stack of document snapshots.

use crate::document::SerializedDocument;
use crate::settings::MAX_UNDO_HISTORY;

/// Linear history of serialized documents.
///
/// Interactions pause the history while they run so that intermediate
/// states are never recorded, then persist once when they commit.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<SerializedDocument>,
    pointer: usize,
    paused: bool,
    max_len: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl History {
    pub fn new(max_len: usize) -> Self {
        Self {
            stack: Vec::new(),
            pointer: 0,
            paused: false,
            max_len: max_len.max(1),
        }
    }

    /// Forget everything and start from `initial`.
    pub fn reset(&mut self, initial: SerializedDocument) {
        self.stack = vec![initial];
        self.pointer = 0;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if self.paused {
            log::warn!("History paused twice");
            return;
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if !self.paused {
            log::warn!("History resumed while not paused");
            return;
        }
        self.paused = false;
    }

    /// Record a snapshot as the newest state, dropping any redo states.
    ///
    /// Returns false if nothing was recorded (paused, or unchanged).
    pub fn persist(&mut self, snapshot: SerializedDocument) -> bool {
        if self.paused {
            log::debug!("History is paused, not persisting");
            return false;
        }
        if self.stack.get(self.pointer) == Some(&snapshot) {
            return false;
        }
        self.stack.truncate(self.pointer + 1);
        self.stack.push(snapshot);
        if self.stack.len() > self.max_len {
            let overflow = self.stack.len() - self.max_len;
            self.stack.drain(..overflow);
        }
        self.pointer = self.stack.len() - 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.paused && self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.paused && self.pointer + 1 < self.stack.len()
    }

    /// Step back, returning the snapshot to restore.
    pub fn undo(&mut self) -> Option<&SerializedDocument> {
        if !self.can_undo() {
            return None;
        }
        self.pointer -= 1;
        self.stack.get(self.pointer)
    }

    /// Step forward, returning the snapshot to restore.
    pub fn redo(&mut self) -> Option<&SerializedDocument> {
        if !self.can_redo() {
            return None;
        }
        self.pointer += 1;
        self.stack.get(self.pointer)
    }

    /// Number of recorded states.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
