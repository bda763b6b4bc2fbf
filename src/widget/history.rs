/// A single text edit: the markup before and after
#[derive(Debug, Clone, PartialEq, Eq)]
struct TextEdit {
    before: String,
    after: String,
}

/// Snapshot undo/redo history for the source widget
#[derive(Debug, Default)]
pub struct EditHistory {
    /// Edits that can be undone
    undo_stack: Vec<TextEdit>,
    /// Edits that can be redone
    redo_stack: Vec<TextEdit>,
}

impl EditHistory {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit. No-op edits are ignored.
    pub fn record(&mut self, before: String, after: String) {
        if before == after {
            return;
        }
        self.undo_stack.push(TextEdit { before, after });
        self.redo_stack.clear(); // a new edit invalidates the redo branch
    }

    /// Undo the last edit, returning the text to restore
    pub fn undo(&mut self) -> Option<String> {
        let edit = self.undo_stack.pop()?;
        let text = edit.before.clone();
        self.redo_stack.push(edit);
        Some(text)
    }

    /// Redo the last undone edit, returning the text to restore
    pub fn redo(&mut self) -> Option<String> {
        let edit = self.redo_stack.pop()?;
        let text = edit.after.clone();
        self.undo_stack.push(edit);
        Some(text)
    }

    /// Returns true if there are edits that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are edits that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear the history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
