use crate::dataset::PackedDataset;

/// Undo/redo over whole dataset snapshots.
///
/// Structural edits produce brand-new datasets, so history keeps the
/// previous values instead of inverse operations; `record` is called with
/// the dataset as it was before an edit. Depth is bounded, oldest entries
/// dropped first.
pub struct History {
    undo_stack: Vec<PackedDataset>,
    redo_stack: Vec<PackedDataset>,
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the pre-edit dataset (clears the redo stack).
    pub fn record(&mut self, before: PackedDataset) {
        if self.undo_stack.len() >= self.max_depth {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(before);
        self.redo_stack.clear();
    }

    /// Swap the current dataset for the last recorded one.
    pub fn undo(&mut self, current: PackedDataset) -> Option<PackedDataset> {
        self.undo_stack.pop().map(|prev| {
            self.redo_stack.push(current);
            prev
        })
    }

    /// Swap the current dataset for the last undone one.
    pub fn redo(&mut self, current: PackedDataset) -> Option<PackedDataset> {
        self.redo_stack.pop().map(|next| {
            self.undo_stack.push(current);
            next
        })
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
