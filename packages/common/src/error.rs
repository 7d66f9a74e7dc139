use blockprompt_parser::DefinitionError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the block library and its backing store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid definition: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Duplicate block id in library: {0}")]
    DuplicateBlock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed library file: {0}")]
    Json(#[from] serde_json::Error),
}
