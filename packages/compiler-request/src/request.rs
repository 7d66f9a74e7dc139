use crate::context::RequestOptions;
use crate::flatten::{flatten_segments, flatten_string, ResolvedUsage};
use blockprompt_editor::{to_string, Segment};
use blockprompt_parser::DefinitionLookup;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Payload for the generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Canonical prompt string, tokens included
    pub prompt: String,
    pub blocks: Vec<ResolvedUsage>,
}

impl GenerationRequest {
    pub fn to_json(&self) -> Result<String, RequestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_empty(prompt: &str, options: &RequestOptions) -> Result<(), RequestError> {
    if options.reject_empty && prompt.trim().is_empty() {
        return Err(RequestError::EmptyPrompt);
    }
    Ok(())
}

/// Build a request from a segment list
#[instrument(skip_all, fields(segments = segments.len()))]
pub fn build_request(
    segments: &[Segment],
    lookup: &dyn DefinitionLookup,
    options: &RequestOptions,
) -> Result<GenerationRequest, RequestError> {
    let prompt = to_string(segments, lookup);
    check_empty(&prompt, options)?;

    let blocks = flatten_segments(segments, lookup, options);
    info!(blocks = blocks.len(), "Built generation request");
    Ok(GenerationRequest { prompt, blocks })
}

/// Build a request from a canonical string
#[instrument(skip_all, fields(len = source.len()))]
pub fn build_request_from_string(
    source: &str,
    lookup: &dyn DefinitionLookup,
    options: &RequestOptions,
) -> Result<GenerationRequest, RequestError> {
    check_empty(source, options)?;

    let blocks = flatten_string(source, lookup, options);
    info!(blocks = blocks.len(), "Built generation request");
    Ok(GenerationRequest {
        prompt: source.to_string(),
        blocks,
    })
}
