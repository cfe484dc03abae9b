use std::collections::VecDeque;

/// Bounded undo/redo history of document snapshots.
///
/// The snapshot under the cursor is the current document. Recording a new
/// snapshot after an undo drops everything that could have been redone, and
/// once the limit is reached the oldest snapshot is evicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    snapshots: VecDeque<String>,
    cursor: usize,
    limit: usize,
}

impl History {
    /// Starts a history holding `initial`. A limit of zero is treated as one.
    pub fn new(initial: String, limit: usize) -> Self {
        let limit = limit.max(1);
        let mut snapshots = VecDeque::with_capacity(limit.min(64));
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            limit,
        }
    }

    pub fn current(&self) -> &str {
        &self.snapshots[self.cursor]
    }

    /// Records `snapshot` as the new current document.
    ///
    /// Returns false, recording nothing, when it equals the current one.
    pub fn push(&mut self, snapshot: String) -> bool {
        if snapshot == self.current() {
            return false;
        }
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        true
    }

    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
