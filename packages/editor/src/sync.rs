//! # Caret-Preserving Sync
//!
//! Keeps the canonical string and the rich surface in step.
//!
//! ```text
//!   surface edit ──forward──▶ canonical string
//!   canonical string ──backward──▶ re-rendered surface
//! ```
//!
//! A single [`SyncPhase`] replaces a pair of suppression flags. A completed
//! forward cycle stays in `SyncingForward` until [`SyncEngine::tick`], so the
//! re-render its publication triggers is swallowed; a completed backward cycle
//! stays in `SyncingBackward`, so the input event raised by its own DOM
//! mutation is swallowed. Phases are entered through [`PhaseGuard`], which puts
//! the previous phase back if a cycle exits early.

use crate::surface::EditableBuffer;
use blockprompt_evaluator::Evaluator;
use blockprompt_parser::{
    serialize, serialize_token, tokenize, BlockDefinition, DefinitionError, DefinitionLookup,
    IDGenerator, ParamValues,
};
use thiserror::Error;
use tracing::{debug, instrument, trace};

const MARKER_OPEN: char = '\u{E000}';
const MARKER_CLOSE: char = '\u{E001}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    SyncingForward,
    SyncingBackward,
}

/// Scoped phase transition. Dropping the guard restores the phase it replaced
/// unless [`PhaseGuard::hold`] was called.
pub struct PhaseGuard<'a> {
    phase: &'a mut SyncPhase,
    previous: SyncPhase,
    held: bool,
}

impl<'a> PhaseGuard<'a> {
    pub fn enter(phase: &'a mut SyncPhase, next: SyncPhase) -> Self {
        let previous = std::mem::replace(phase, next);
        Self {
            phase,
            previous,
            held: false,
        }
    }

    pub fn switch(&mut self, next: SyncPhase) {
        *self.phase = next;
    }

    /// Keep the current phase after the guard drops (until the next tick)
    pub fn hold(mut self) {
        self.held = true;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.held {
            *self.phase = self.previous;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Forward sync published a new canonical string
    Published(String),

    /// Backward sync re-rendered the surface
    Rendered,

    /// Swallowed by the current phase
    Suppressed,

    /// Nothing changed
    Unchanged,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("No token at index {0}")]
    TokenNotFound(usize),

    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Insertion marker was not found in the surface text")]
    MarkerLost,

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// A token opened for parameter editing
#[derive(Debug, Clone, PartialEq)]
pub struct TokenEdit {
    pub index: usize,
    pub block_id: String,
    pub definition: BlockDefinition,

    /// Every declared parameter at its effective value, plus any undeclared
    /// keys the token carried
    pub values: ParamValues,

    pub raw: String,
}

pub struct SyncEngine<B: EditableBuffer> {
    buffer: B,
    canonical: String,
    phase: SyncPhase,
    evaluator: Evaluator,
    ids: IDGenerator,
}

impl<B: EditableBuffer> SyncEngine<B> {
    /// Mount `buffer` showing `canonical`
    pub fn new(buffer: B, canonical: impl Into<String>, lookup: &dyn DefinitionLookup) -> Self {
        Self::with_evaluator(buffer, canonical, lookup, Evaluator::new())
    }

    pub fn with_evaluator(
        mut buffer: B,
        canonical: impl Into<String>,
        lookup: &dyn DefinitionLookup,
        evaluator: Evaluator,
    ) -> Self {
        let canonical = canonical.into();
        buffer.replace_view(evaluator.render(&canonical, lookup));
        Self {
            buffer,
            canonical,
            phase: SyncPhase::Idle,
            evaluator,
            ids: IDGenerator::new("sync-marker"),
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Mutable access for driving the surface (typing, caret moves)
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// Surface and canonical string describe the same prompt
    pub fn is_consistent(&self) -> bool {
        self.buffer.plain_representation() == self.canonical
    }

    /// Start of the next event-loop tick: release any held phase
    pub fn tick(&mut self) {
        if self.phase != SyncPhase::Idle {
            trace!(phase = ?self.phase, "Releasing sync phase");
        }
        self.phase = SyncPhase::Idle;
    }

    /// Forward sync after a raw edit event on the surface
    pub fn handle_input(&mut self) -> SyncOutcome {
        if self.phase == SyncPhase::SyncingBackward {
            trace!("Input raised by re-render suppressed");
            return SyncOutcome::Suppressed;
        }

        let guard = PhaseGuard::enter(&mut self.phase, SyncPhase::SyncingForward);
        let text = self.buffer.plain_representation();
        if text == self.canonical {
            return SyncOutcome::Unchanged;
        }

        debug!(len = text.len(), "Publishing surface text");
        self.canonical.clone_from(&text);
        guard.hold();
        SyncOutcome::Published(text)
    }

    /// Backward sync for a canonical string changed outside the surface
    #[instrument(skip(self, value, lookup), fields(len = value.len()))]
    pub fn set_canonical(&mut self, value: &str, lookup: &dyn DefinitionLookup) -> SyncOutcome {
        if self.phase == SyncPhase::SyncingForward {
            trace!("Re-render of published text suppressed");
            return SyncOutcome::Suppressed;
        }
        if value == self.canonical {
            return SyncOutcome::Unchanged;
        }

        let guard = PhaseGuard::enter(&mut self.phase, SyncPhase::SyncingBackward);
        let caret = self
            .buffer
            .caret()
            .map(|caret| remap_caret(&self.canonical, value, caret));

        self.buffer.replace_view(self.evaluator.render(value, lookup));
        self.buffer.set_caret(caret);
        self.canonical = value.to_string();
        guard.hold();
        SyncOutcome::Rendered
    }

    /// Re-render the current string, e.g. after definitions changed
    pub fn refresh(&mut self, lookup: &dyn DefinitionLookup) {
        let guard = PhaseGuard::enter(&mut self.phase, SyncPhase::SyncingBackward);
        let caret = self.buffer.caret();
        self.buffer
            .replace_view(self.evaluator.render(&self.canonical, lookup));
        self.buffer.set_caret(caret);
        guard.hold();
    }

    /// Insert a block at the caret (or the end) with marker substitution and
    /// return the new canonical string. A focused surface gets its caret
    /// after the new token; a blurred one stays blurred.
    #[instrument(skip(self, definition, values, lookup), fields(block_id = %definition.id))]
    pub fn insert_block(
        &mut self,
        definition: &BlockDefinition,
        values: &ParamValues,
        lookup: &dyn DefinitionLookup,
    ) -> Result<String, SyncError> {
        let mut guard = PhaseGuard::enter(&mut self.phase, SyncPhase::SyncingForward);

        let marker = format!("{}marker-{}{}", MARKER_OPEN, self.ids.new_id(), MARKER_CLOSE);
        let focused = self.buffer.insert_at_cursor(&marker);
        if !focused {
            debug!("No caret on surface, inserting at end");
        }

        let text = self.buffer.plain_representation();
        let Some(at) = text.find(&marker) else {
            self.buffer
                .replace_view(self.evaluator.render(&self.canonical, lookup));
            return Err(SyncError::MarkerLost);
        };

        let token = serialize(definition, values);
        let published = text.replacen(&marker, &token, 1);
        self.canonical.clone_from(&published);

        guard.switch(SyncPhase::SyncingBackward);
        self.buffer
            .replace_view(self.evaluator.render(&published, lookup));
        if focused {
            self.buffer.set_caret(Some(at + token.len()));
        }
        guard.hold();

        Ok(published)
    }

    /// Open the token at `index` for parameter editing
    pub fn open_token(&self, index: usize, lookup: &dyn DefinitionLookup) -> Result<TokenEdit, SyncError> {
        let tokens = tokenize(&self.canonical);
        let token = tokens.get(index).ok_or(SyncError::TokenNotFound(index))?;
        let definition = lookup
            .definition(token.block_id)
            .ok_or_else(|| SyncError::UnknownBlock(token.block_id.to_string()))?;

        let mut values = token.params();
        for param in &definition.params {
            values
                .entry(param.key.clone())
                .or_insert_with(|| param.default.clone());
        }

        Ok(TokenEdit {
            index,
            block_id: token.block_id.to_string(),
            definition: definition.clone(),
            values,
            raw: token.raw.to_string(),
        })
    }

    /// Replace the token at `index` with one carrying `values`, re-render, and
    /// return the new canonical string
    pub fn save_token(
        &mut self,
        index: usize,
        values: &ParamValues,
        lookup: &dyn DefinitionLookup,
    ) -> Result<String, SyncError> {
        let (span, replacement) = {
            let tokens = tokenize(&self.canonical);
            let token = tokens.get(index).ok_or(SyncError::TokenNotFound(index))?;
            let definition = lookup
                .definition(token.block_id)
                .ok_or_else(|| SyncError::UnknownBlock(token.block_id.to_string()))?;
            (token.span(), serialize_token(token.block_id, values, Some(definition)))
        };

        let guard = PhaseGuard::enter(&mut self.phase, SyncPhase::SyncingBackward);
        let caret = span.start + replacement.len();
        self.canonical.replace_range(span, &replacement);

        self.buffer
            .replace_view(self.evaluator.render(&self.canonical, lookup));
        self.buffer.set_caret(Some(caret));
        guard.hold();

        Ok(self.canonical.clone())
    }
}

/// Map a caret in `old` onto `new` across a single changed region
fn remap_caret(old: &str, new: &str, caret: usize) -> usize {
    let mut prefix = old
        .bytes()
        .zip(new.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = old.len().min(new.len()) - prefix;
    let mut suffix = old
        .bytes()
        .rev()
        .zip(new.bytes().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(old.len() - suffix) {
        suffix -= 1;
    }

    if caret <= prefix {
        caret
    } else if caret >= old.len() - suffix {
        (caret + new.len()).saturating_sub(old.len()).min(new.len())
    } else {
        new.len() - suffix
    }
}
