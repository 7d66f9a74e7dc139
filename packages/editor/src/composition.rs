//! # Composition
//!
//! A composed prompt held as segments. Every mutation leaves the list
//! normalized (see [`crate::segment`]).
//!
//! ## Lifecycle
//!
//! ```text
//! from_string / new → insert / move / remove / edit → to_source → request
//! ```

use crate::mutations::MutationError;
use crate::reorder::move_target;
use crate::segment::{self, BlockSegment, Segment};
use blockprompt_parser::{is_valid_block_id, DefinitionLookup, IDGenerator, ParamValues};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Composition {
    segments: Vec<Segment>,
    ids: IDGenerator,

    /// Increments on every applied mutation
    pub version: u64,
}

impl Composition {
    /// Empty composition: a single empty text segment
    pub fn new() -> Self {
        Self::with_ids(IDGenerator::default())
    }

    pub fn with_ids(mut ids: IDGenerator) -> Self {
        let segments = segment::normalize(Vec::new(), &mut ids);
        Self {
            segments,
            ids,
            version: 0,
        }
    }

    pub fn from_string(source: &str, lookup: &dyn DefinitionLookup) -> Self {
        let mut composition = Self::new();
        composition.replace_from_string(source, lookup);
        composition
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut ids = IDGenerator::default();
        let segments = segment::normalize(segments, &mut ids);
        Self {
            segments,
            ids,
            version: 0,
        }
    }

    /// Rebuild all segments from a canonical string, keeping the id sequence
    pub fn replace_from_string(&mut self, source: &str, lookup: &dyn DefinitionLookup) {
        self.segments = segment::from_string(source, lookup, &mut self.ids);
    }

    /// Canonical string form
    pub fn to_source(&self, lookup: &dyn DefinitionLookup) -> String {
        segment::to_string(&self.segments, lookup)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn position(&self, segment_id: &str) -> Option<usize> {
        self.segments.iter().position(|s| s.id() == segment_id)
    }

    pub fn find(&self, segment_id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id() == segment_id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BlockSegment> {
        self.segments.iter().filter_map(Segment::as_block)
    }

    /// Replace the whole list (used by undo/redo)
    pub(crate) fn restore(&mut self, segments: Vec<Segment>) {
        self.segments = segment::normalize(segments, &mut self.ids);
    }

    fn normalize(&mut self) {
        let segments = std::mem::take(&mut self.segments);
        self.segments = segment::normalize(segments, &mut self.ids);
    }

    /// Splice a new block at `index` (clamped), guaranteeing a text segment
    /// directly before and after it. Returns the new segment's id.
    pub fn insert_block(
        &mut self,
        index: usize,
        block_id: &str,
        values: ParamValues,
    ) -> Result<String, MutationError> {
        if !is_valid_block_id(block_id) {
            return Err(MutationError::InvalidBlockId(block_id.to_string()));
        }

        let mut index = index.min(self.segments.len());

        if index == 0 || !self.segments[index - 1].is_text() {
            self.segments.insert(index, Segment::text(self.ids.new_id(), ""));
            index += 1;
        }

        let id = self.ids.new_id();
        self.segments
            .insert(index, Segment::block(id.clone(), block_id, values));

        let next = index + 1;
        if next >= self.segments.len() || !self.segments[next].is_text() {
            self.segments.insert(next, Segment::text(self.ids.new_id(), ""));
        }

        self.normalize();
        Ok(id)
    }

    /// Delete a segment and merge the texts that become adjacent
    pub fn remove_segment(&mut self, segment_id: &str) -> Result<Segment, MutationError> {
        let pos = self
            .position(segment_id)
            .ok_or_else(|| MutationError::SegmentNotFound(segment_id.to_string()))?;
        let removed = self.segments.remove(pos);
        self.normalize();
        Ok(removed)
    }

    /// Move a segment to a drop-zone index (`0..=len`, zone `i` sits before segment `i`)
    pub fn move_segment(&mut self, segment_id: &str, target_index: usize) -> Result<(), MutationError> {
        let from = self
            .position(segment_id)
            .ok_or_else(|| MutationError::SegmentNotFound(segment_id.to_string()))?;
        let target = move_target(from, target_index.min(self.segments.len()));

        if target != from {
            let segment = self.segments.remove(from);
            self.segments.insert(target.min(self.segments.len()), segment);
            self.normalize();
        }
        Ok(())
    }

    pub fn update_text(&mut self, segment_id: &str, value: &str) -> Result<(), MutationError> {
        match self.segments.iter_mut().find(|s| s.id() == segment_id) {
            Some(Segment::Text(text)) => {
                text.value = value.to_string();
                Ok(())
            }
            Some(Segment::Block(_)) => Err(MutationError::NotText(segment_id.to_string())),
            None => Err(MutationError::SegmentNotFound(segment_id.to_string())),
        }
    }

    pub fn set_param(&mut self, segment_id: &str, key: &str, value: Value) -> Result<(), MutationError> {
        if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == '=') {
            return Err(MutationError::InvalidParamKey(key.to_string()));
        }
        let block = self.block_mut(segment_id)?;
        block.values.insert(key.to_string(), value);
        block.verbatim = None;
        Ok(())
    }

    pub fn set_values(&mut self, segment_id: &str, values: ParamValues) -> Result<(), MutationError> {
        let block = self.block_mut(segment_id)?;
        block.values = values;
        block.verbatim = None;
        Ok(())
    }

    pub fn set_context(
        &mut self,
        segment_id: &str,
        url: Option<String>,
        data: Option<Value>,
    ) -> Result<(), MutationError> {
        let block = self.block_mut(segment_id)?;
        block.context_url = url;
        block.context_data = data;
        Ok(())
    }

    fn block_mut(&mut self, segment_id: &str) -> Result<&mut BlockSegment, MutationError> {
        match self.segments.iter_mut().find(|s| s.id() == segment_id) {
            Some(segment) => segment
                .as_block_mut()
                .ok_or_else(|| MutationError::NotABlock(segment_id.to_string())),
            None => Err(MutationError::SegmentNotFound(segment_id.to_string())),
        }
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}
