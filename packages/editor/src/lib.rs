//! # blockprompt editor
//!
//! Keeps a composite prompt consistent across its three views.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: token grammar + block definitions   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - Segment model (text/block alternation)   │
//! │  - Mutations + undo on segments             │
//! │  - Drag/drop reorder                        │
//! │  - Caret-preserving surface sync            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ evaluator: canonical string → rich view     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The canonical string is the source of truth**: the rich surface and
//!    the segment list are derived from it and publish back into it
//! 2. **Segments always alternate**: every block has a text segment on each
//!    side, and the list is never empty
//! 3. **One sync phase at a time**: a cycle's own echo is swallowed, never
//!    re-published
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blockprompt_common::JsonFileStore;
//! use blockprompt_editor::{Composer, Mutation, RichSurface};
//!
//! let store = Box::new(JsonFileStore::new("blocks.json"));
//! let mut composer = Composer::new(store, RichSurface::new(), "Intro ")?;
//!
//! composer.insert_block_at_caret("fade_in")?;
//! composer.tick();
//!
//! let first = composer.composition().segments()[1].id().to_string();
//! composer.apply(Mutation::MoveSegment { segment_id: first, target_index: 0 })?;
//! ```

mod composer;
mod composition;
mod errors;
mod mutations;
mod reorder;
mod segment;
mod surface;
mod sync;
mod undo_stack;

pub use composer::Composer;
pub use composition::Composition;
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationResult};
pub use reorder::{move_target, DragPayload, DropZones, BLOCK_MIME, SEGMENT_MIME};
pub use segment::{
    from_string, is_normalized, normalize, same_content, to_string, BlockSegment, Segment,
    TextSegment,
};
pub use surface::{EditableBuffer, RichSurface};
pub use sync::{PhaseGuard, SyncEngine, SyncError, SyncOutcome, SyncPhase, TokenEdit};
pub use undo_stack::{MutationBatch, UndoStack};

// Re-export common types for convenience
pub use blockprompt_evaluator::{RichNode, RichView};
pub use blockprompt_parser::{BlockDefinition, ParamValues};
