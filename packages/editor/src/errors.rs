//! Error types for the editor

use blockprompt_common::StoreError;
use blockprompt_parser::DefinitionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Sync error: {0}")]
    Sync(#[from] crate::sync::SyncError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),
}
