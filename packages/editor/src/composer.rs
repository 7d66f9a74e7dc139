//! # Composer
//!
//! Ties the three views of a prompt together: the canonical string, the rich
//! surface (through [`SyncEngine`]) and the segmented list (a
//! [`Composition`]). The canonical string is the source of truth; whichever
//! view changes publishes a new string and the other two follow.
//!
//! Definitions come from an injected [`DefinitionStore`]. Library edits are
//! written back immediately.

use crate::composition::Composition;
use crate::errors::EditorError;
use crate::mutations::{Mutation, MutationResult};
use crate::reorder::{DragPayload, DropZones};
use crate::segment::same_content;
use crate::surface::EditableBuffer;
use crate::sync::{SyncEngine, SyncOutcome, SyncPhase, TokenEdit};
use crate::undo_stack::UndoStack;
use blockprompt_common::{BlockLibrary, DefinitionStore, LibraryEntry, StoreError};
use blockprompt_evaluator::{Evaluator, RenderOptions};
use blockprompt_parser::{ParamDef, ParamValues};
use tracing::{debug, info};

pub struct Composer<B: EditableBuffer> {
    store: Box<dyn DefinitionStore>,
    library: BlockLibrary,
    composition: Composition,
    engine: SyncEngine<B>,
    history: UndoStack,
    zones: DropZones,

    /// A structural change was published while the surface was mid-cycle
    stale: bool,

    /// A loaded string the surface was too busy to take
    pending_load: Option<String>,
}

impl<B: EditableBuffer> Composer<B> {
    pub fn new(store: Box<dyn DefinitionStore>, buffer: B, source: &str) -> Result<Self, EditorError> {
        Self::with_options(store, buffer, source, RenderOptions::default())
    }

    pub fn with_options(
        store: Box<dyn DefinitionStore>,
        buffer: B,
        source: &str,
        options: RenderOptions,
    ) -> Result<Self, EditorError> {
        let library = BlockLibrary::load(store.as_ref())?;
        info!(blocks = library.len(), "Loaded block library");

        let composition = Composition::from_string(source, &library);
        let engine = SyncEngine::with_evaluator(buffer, source, &library, Evaluator::with_options(options));

        Ok(Self {
            store,
            library,
            composition,
            engine,
            history: UndoStack::new(),
            zones: DropZones::new(),
            stale: false,
            pending_load: None,
        })
    }

    pub fn canonical(&self) -> &str {
        self.engine.canonical()
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn library(&self) -> &BlockLibrary {
        &self.library
    }

    pub fn engine(&self) -> &SyncEngine<B> {
        &self.engine
    }

    pub fn buffer_mut(&mut self) -> &mut B {
        self.engine.buffer_mut()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn phase(&self) -> SyncPhase {
        self.engine.phase()
    }

    /// All three views agree and no cycle is pending
    pub fn is_settled(&self) -> bool {
        let parsed = Composition::from_string(self.engine.canonical(), &self.library);
        !self.stale
            && self.pending_load.is_none()
            && self.engine.phase() == SyncPhase::Idle
            && self.engine.is_consistent()
            && same_content(self.composition.segments(), parsed.segments())
    }

    /// Next event-loop tick: release the sync phase and catch up on any
    /// structural change the previous cycle swallowed
    pub fn tick(&mut self) {
        self.engine.tick();
        if let Some(source) = self.pending_load.take() {
            self.engine.set_canonical(&source, &self.library);
        } else if self.stale {
            self.stale = false;
            self.publish_composition();
        }
    }

    /// Raw edit event from the rich surface
    pub fn handle_input(&mut self) -> SyncOutcome {
        let outcome = self.engine.handle_input();
        if let SyncOutcome::Published(text) = &outcome {
            self.pending_load = None;
            self.adopt_canonical(text.clone());
        }
        outcome
    }

    /// Load a different prompt into every view. The string is kept exactly
    /// as given; the segments are rebuilt from it.
    pub fn load(&mut self, source: &str) {
        self.adopt_canonical(source.to_string());
        self.stale = false;
        if self.engine.set_canonical(source, &self.library) == SyncOutcome::Suppressed {
            debug!("Surface busy, deferring load to next tick");
            self.pending_load = Some(source.to_string());
        } else {
            self.pending_load = None;
        }
    }

    /// Apply a structural edit from the segmented view
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let result = self.history.apply(&mutation, &mut self.composition)?;
        debug!(mutation = mutation.name(), version = result.version, "Applied mutation");
        self.publish_composition();
        Ok(result)
    }

    pub fn hover_zone(&mut self, zone: usize) {
        self.zones.hover(zone);
    }

    pub fn leave_zones(&mut self) {
        self.zones.clear();
    }

    /// Drop onto the segmented view. Unrecognized payloads are a no-op.
    pub fn drop_payload(
        &mut self,
        payload: Option<DragPayload>,
        event_index: usize,
    ) -> Result<Option<MutationResult>, EditorError> {
        match self
            .zones
            .resolve(payload, event_index, &self.composition, &self.library)
        {
            Some(mutation) => self.apply(mutation).map(Some),
            None => Ok(None),
        }
    }

    /// Drop a block definition onto the rich surface at its caret
    pub fn insert_block_at_caret(&mut self, block_id: &str) -> Result<String, EditorError> {
        let definition = self
            .library
            .get(block_id)
            .ok_or_else(|| StoreError::BlockNotFound(block_id.to_string()))?
            .clone();

        let published = self
            .engine
            .insert_block(&definition, &definition.defaults(), &self.library)?;
        self.adopt_canonical(published.clone());
        Ok(published)
    }

    pub fn open_token(&self, index: usize) -> Result<TokenEdit, EditorError> {
        Ok(self.engine.open_token(index, &self.library)?)
    }

    pub fn save_token(&mut self, index: usize, values: &ParamValues) -> Result<String, EditorError> {
        let saved = self.engine.save_token(index, values, &self.library)?;
        self.adopt_canonical(saved.clone());
        Ok(saved)
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.composition);
        if undone {
            self.publish_composition();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.composition);
        if redone {
            self.publish_composition();
        }
        redone
    }

    /// Add a new library entry and persist the library. An id that already
    /// exists is rejected with [`StoreError::DuplicateBlock`].
    pub fn add_definition(&mut self, entry: LibraryEntry) -> Result<(), EditorError> {
        self.library.insert(entry)?;
        self.persist_library()
    }

    pub fn append_param(&mut self, block_id: &str, param: ParamDef) -> Result<(), EditorError> {
        self.library.append_param(block_id, param)?;
        self.persist_library()
    }

    /// Remove a definition. Tokens referencing it stay in the prompt as
    /// unresolved blocks.
    pub fn remove_definition(&mut self, block_id: &str) -> Result<Option<LibraryEntry>, EditorError> {
        let removed = self.library.remove(block_id);
        if removed.is_some() {
            self.persist_library()?;
        }
        Ok(removed)
    }

    fn persist_library(&mut self) -> Result<(), EditorError> {
        self.library.save(self.store.as_ref())?;
        self.engine.refresh(&self.library);
        let source = self.engine.canonical().to_string();
        self.composition.replace_from_string(&source, &self.library);
        Ok(())
    }

    /// A string arrived through the surface: rebuild the segments from it.
    /// Segment history no longer applies to the new text.
    fn adopt_canonical(&mut self, source: String) {
        self.composition.replace_from_string(&source, &self.library);
        self.history.clear();
    }

    fn publish_composition(&mut self) {
        let source = self.composition.to_source(&self.library);
        if self.engine.set_canonical(&source, &self.library) == SyncOutcome::Suppressed {
            debug!("Surface busy, deferring re-render to next tick");
            self.stale = true;
        }
    }
}
