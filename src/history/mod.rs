//! Undo/redo history.
//!
//! The log holds every applied command in order with a cursor between the
//! done and undone halves. Applying a new command throws away the undone
//! tail. Replaying `commands()[..cursor()]` on the base document reproduces
//! the current one.

mod command;

pub use command::{CanvasSnapshot, Command, DirtyRegion, EditRecorder, PixelChange, PixelEdit};

use crate::document::Document;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct CommandLog {
    commands: Vec<Command>,
    cursor: usize,
    /// Cursor position at the last save. `None` once that state is unreachable.
    saved: Option<usize>,
    limit: Option<usize>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            cursor: 0,
            saved: Some(0),
            limit: None,
        }
    }

    /// A log that keeps at most `limit` commands, dropping the oldest.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.map(|l| l.max(1)),
            ..Self::new()
        }
    }

    /// Run `command` against `doc` and record it.
    ///
    /// If the command fails, neither the document nor the log change.
    pub fn apply(&mut self, doc: &mut Document, command: Command) -> Result<DirtyRegion> {
        let dirty = command.apply(doc)?;
        tracing::debug!(label = %command.label(), cursor = self.cursor, "applied command");

        self.commands.truncate(self.cursor);
        if self.saved.is_some_and(|s| s > self.cursor) {
            self.saved = None;
        }
        self.commands.push(command);
        self.cursor += 1;
        self.enforce_limit();
        Ok(dirty)
    }

    /// Revert the last done command. `None` at the bottom of the history.
    pub fn undo(&mut self, doc: &mut Document) -> Option<DirtyRegion> {
        let index = self.cursor.checked_sub(1)?;
        let command = &self.commands[index];
        match command.revert(doc) {
            Ok(dirty) => {
                tracing::debug!(label = %command.label(), "undid command");
                self.cursor = index;
                Some(dirty)
            }
            Err(err) => {
                tracing::error!(label = %command.label(), error = %err, "undo failed");
                debug_assert!(false, "history diverged from document: {}", err);
                None
            }
        }
    }

    /// Re-apply the next undone command. `None` at the top of the history.
    pub fn redo(&mut self, doc: &mut Document) -> Option<DirtyRegion> {
        let command = self.commands.get(self.cursor)?;
        match command.apply(doc) {
            Ok(dirty) => {
                tracing::debug!(label = %command.label(), "redid command");
                self.cursor += 1;
                Some(dirty)
            }
            Err(err) => {
                tracing::error!(label = %command.label(), error = %err, "redo failed");
                debug_assert!(false, "history diverged from document: {}", err);
                None
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    pub fn undo_label(&self) -> Option<String> {
        self.cursor
            .checked_sub(1)
            .map(|i| self.commands[i].label())
    }

    pub fn redo_label(&self) -> Option<String> {
        self.commands.get(self.cursor).map(Command::label)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Forget everything. Used on revert-to-saved and new project; not undoable.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
        self.saved = Some(0);
    }

    /// Whether the document differs from the last saved state.
    pub fn is_dirty(&self) -> bool {
        self.saved != Some(self.cursor)
    }

    pub fn mark_saved(&mut self) {
        self.saved = Some(self.cursor);
    }

    /// Rebuild the current document from `base` by replaying done commands.
    pub fn replay(&self, base: &Document) -> Result<Document> {
        let mut doc = base.clone();
        for command in &self.commands[..self.cursor] {
            command.apply(&mut doc)?;
        }
        Ok(doc)
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        let excess = self.commands.len().saturating_sub(limit);
        if excess == 0 {
            return;
        }
        self.commands.drain(..excess);
        self.cursor -= excess;
        self.saved = self.saved.and_then(|s| s.checked_sub(excess));
        tracing::debug!(dropped = excess, "history limit reached");
    }
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}
