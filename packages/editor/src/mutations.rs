//! # Segment Mutations
//!
//! Semantic operations on a [`Composition`]. Every mutation validates before
//! touching the segment list and leaves the list normalized afterwards.
//!
//! ## Mutation Semantics
//!
//! ### InsertBlock
//! - Index is a drop-zone index and is clamped to the list length
//! - Empty text segments are added around the block when a neighbour is missing
//!
//! ### MoveSegment
//! - Target is a drop-zone index taken before the source is removed
//! - A target after the source shifts left by one
//!
//! ### RemoveSegment
//! - Texts that become adjacent merge
//! - The list never ends up empty
//!
//! ### UpdateText / SetParam
//! - Atomic replacement, last write wins

use crate::composition::Composition;
use blockprompt_parser::{is_valid_block_id, ParamValues};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Splice a new block at a drop-zone index
    InsertBlock {
        index: usize,
        block_id: String,
        values: ParamValues,
    },

    RemoveSegment {
        segment_id: String,
    },

    /// Move an existing segment to a drop-zone index
    MoveSegment {
        segment_id: String,
        target_index: usize,
    },

    UpdateText {
        segment_id: String,
        value: String,
    },

    SetParam {
        segment_id: String,
        key: String,
        value: Value,
    },

    /// Attach (or clear) reference context on a block
    SetContext {
        segment_id: String,
        url: Option<String>,
        data: Option<Value>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    #[error("Segment is not text: {0}")]
    NotText(String),

    #[error("Segment is not a block: {0}")]
    NotABlock(String),

    #[error("Invalid block id: {0:?}")]
    InvalidBlockId(String),

    #[error("Invalid parameter key: {0:?}")]
    InvalidParamKey(String),
}

/// Outcome of an applied mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Composition version after the mutation
    pub version: u64,

    /// Id of the segment created by the mutation, if any
    pub segment_id: Option<String>,
}

impl Mutation {
    /// Apply mutation to the composition with validation
    pub fn apply(&self, composition: &mut Composition) -> Result<MutationResult, MutationError> {
        self.validate(composition)?;

        let segment_id = match self {
            Mutation::InsertBlock {
                index,
                block_id,
                values,
            } => Some(composition.insert_block(*index, block_id, values.clone())?),

            Mutation::RemoveSegment { segment_id } => {
                composition.remove_segment(segment_id)?;
                None
            }

            Mutation::MoveSegment {
                segment_id,
                target_index,
            } => {
                composition.move_segment(segment_id, *target_index)?;
                None
            }

            Mutation::UpdateText { segment_id, value } => {
                composition.update_text(segment_id, value)?;
                None
            }

            Mutation::SetParam {
                segment_id,
                key,
                value,
            } => {
                composition.set_param(segment_id, key, value.clone())?;
                None
            }

            Mutation::SetContext {
                segment_id,
                url,
                data,
            } => {
                composition.set_context(segment_id, url.clone(), data.clone())?;
                None
            }
        };

        composition.version += 1;

        Ok(MutationResult {
            version: composition.version,
            segment_id,
        })
    }

    /// Check that the mutation can be applied without changing anything
    pub fn validate(&self, composition: &Composition) -> Result<(), MutationError> {
        match self {
            Mutation::InsertBlock { block_id, .. } => {
                if !is_valid_block_id(block_id) {
                    return Err(MutationError::InvalidBlockId(block_id.clone()));
                }
            }

            Mutation::RemoveSegment { segment_id } | Mutation::MoveSegment { segment_id, .. } => {
                if composition.find(segment_id).is_none() {
                    return Err(MutationError::SegmentNotFound(segment_id.clone()));
                }
            }

            Mutation::UpdateText { segment_id, .. } => match composition.find(segment_id) {
                None => return Err(MutationError::SegmentNotFound(segment_id.clone())),
                Some(segment) if !segment.is_text() => {
                    return Err(MutationError::NotText(segment_id.clone()))
                }
                Some(_) => {}
            },

            Mutation::SetParam { segment_id, key, .. } => {
                if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == '=') {
                    return Err(MutationError::InvalidParamKey(key.clone()));
                }
                Self::validate_block(composition, segment_id)?;
            }

            Mutation::SetContext { segment_id, .. } => {
                Self::validate_block(composition, segment_id)?;
            }
        }

        Ok(())
    }

    fn validate_block(composition: &Composition, segment_id: &str) -> Result<(), MutationError> {
        match composition.find(segment_id) {
            None => Err(MutationError::SegmentNotFound(segment_id.to_string())),
            Some(segment) if segment.as_block().is_none() => {
                Err(MutationError::NotABlock(segment_id.to_string()))
            }
            Some(_) => Ok(()),
        }
    }

    /// Short human-readable name, used as the default undo description
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertBlock { .. } => "Insert block",
            Mutation::RemoveSegment { .. } => "Remove segment",
            Mutation::MoveSegment { .. } => "Move segment",
            Mutation::UpdateText { .. } => "Edit text",
            Mutation::SetParam { .. } => "Set parameter",
            Mutation::SetContext { .. } => "Set context",
        }
    }
}
