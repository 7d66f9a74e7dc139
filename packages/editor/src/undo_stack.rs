//! # Undo/Redo Stack
//!
//! Tracks mutation history for a [`Composition`].
//!
//! ## Design
//!
//! - Each batch records the segment list before and after it ran
//! - Undo restores the "before" snapshot and moves the batch to the redo stack
//! - Redo restores the "after" snapshot
//! - New mutations clear the redo stack
//! - Multiple mutations can be grouped into one undo step
//!
//! Segment lists are small, so whole-list snapshots replace inverse mutations.

use crate::composition::Composition;
use crate::mutations::{Mutation, MutationError, MutationResult};
use crate::segment::Segment;

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// Segments before the first mutation
    pub before: Vec<Segment>,

    /// Segments after the last mutation
    pub after: Vec<Segment>,

    pub description: Option<String>,
}

impl MutationBatch {
    fn starting_at(before: Vec<Segment>) -> Self {
        Self {
            mutations: Vec::new(),
            after: before.clone(),
            before,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<MutationBatch>,
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        composition: &mut Composition,
    ) -> Result<MutationResult, MutationError> {
        let before = composition.segments().to_vec();
        let result = mutation.apply(composition)?;
        let after = composition.segments().to_vec();

        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(mutation.clone());
            batch.after = after;
        } else {
            let mut batch = MutationBatch::starting_at(before).with_description(mutation.name());
            batch.mutations.push(mutation.clone());
            batch.after = after;
            self.push_batch(batch);
        }

        Ok(result)
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self, composition: &Composition) {
        self.current_batch = Some(MutationBatch::starting_at(composition.segments().to_vec()));
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent batch. Returns false when there is nothing to undo.
    pub fn undo(&mut self, composition: &mut Composition) -> bool {
        match self.undo_stack.pop() {
            Some(batch) => {
                composition.restore(batch.before.clone());
                composition.version += 1;
                self.redo_stack.push(batch);
                true
            }
            None => false,
        }
    }

    /// Redo the most recently undone batch
    pub fn redo(&mut self, composition: &mut Composition) -> bool {
        match self.redo_stack.pop() {
            Some(batch) => {
                composition.restore(batch.after.clone());
                composition.version += 1;
                self.undo_stack.push(batch);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
