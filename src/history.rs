//! Snapshot undo/redo history
//!
//! The history stores whole-document snapshots. Committing pushes the state
//! from *before* a change, drops the oldest entry past the limit and clears
//! the redo stack.

use tracing::trace;

use crate::model::Document;

#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Document>,
    redo: Vec<Document>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record `previous` as the state to return to on undo
    pub fn commit(&mut self, previous: Document) {
        if self.limit == 0 {
            return;
        }
        self.undo.push(previous);
        if self.undo.len() > self.limit {
            let overflow = self.undo.len() - self.limit;
            self.undo.drain(..overflow);
        }
        self.redo.clear();
        trace!(depth = self.undo.len(), "history commit");
    }

    /// Step back; `current` moves onto the redo stack
    pub fn undo(&mut self, current: Document) -> Option<Document> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward; `current` moves back onto the undo stack
    pub fn redo(&mut self, current: Document) -> Option<Document> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps available
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Document {
        let mut doc = Document::with_initial_flow("flow_1");
        doc.project_name = name.to_string();
        doc
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::default();
        history.commit(named("a"));

        let restored = history.undo(named("b")).unwrap();
        assert_eq!(restored.project_name, "a");
        assert!(history.can_redo());

        let again = history.redo(restored).unwrap();
        assert_eq!(again.project_name, "b");
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::default();
        assert!(history.undo(named("x")).is_none());
        assert!(history.redo(named("x")).is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut history = History::default();
        history.commit(named("a"));
        let current = history.undo(named("b")).unwrap();
        history.commit(current);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(50);
        for i in 0..60 {
            history.commit(named(&i.to_string()));
        }
        assert_eq!(history.len(), 50);

        let mut current = named("live");
        let mut oldest = String::new();
        while let Some(prev) = history.undo(current) {
            oldest = prev.project_name.clone();
            current = prev;
        }
        assert_eq!(oldest, "10");
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = History::new(0);
        history.commit(named("a"));
        assert!(!history.can_undo());
    }
}
