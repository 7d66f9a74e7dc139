//! # blockprompt compiler-request
//!
//! Context flattening: turns the block references of a composed prompt into
//! fully resolved usage records and wraps them, with the canonical prompt
//! string, into the request handed to a generation backend.

mod context;
mod flatten;
mod request;

pub use context::RequestOptions;
pub use flatten::{
    explain, flatten_segments, flatten_string, ResolvedParam, ResolvedUsage, UsageContext,
    UsageDef,
};
pub use request::{build_request, build_request_from_string, GenerationRequest, RequestError};

#[cfg(test)]
mod tests;
