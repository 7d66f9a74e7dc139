use thiserror::Error;

pub type DefinitionResult<T> = Result<T, DefinitionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Invalid block id '{0}': expected [A-Za-z0-9_-]+")]
    InvalidBlockId(String),

    #[error("Invalid parameter key '{key}' in block {block_id}")]
    InvalidParamKey { block_id: String, key: String },

    #[error("Duplicate parameter '{key}' in block {block_id}")]
    DuplicateParam { block_id: String, key: String },

    #[error("Default of parameter '{key}' in block {block_id} is not a {expected}")]
    DefaultTypeMismatch {
        block_id: String,
        key: String,
        expected: &'static str,
    },

    #[error("Default of select parameter '{key}' in block {block_id} is not one of its options")]
    DefaultNotAnOption { block_id: String, key: String },
}
