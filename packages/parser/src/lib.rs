//! # blockprompt parser
//!
//! The inline token mini-language that embeds block references in prompt
//! text, plus the block definition schema those tokens refer to.

pub mod definition;
pub mod error;
pub mod id_generator;
pub mod serializer;
pub mod tokenizer;

pub use definition::{
    is_valid_block_id, BlockDefinition, DefinitionLookup, ParamDef, ParamType, ParamValues,
};
pub use error::{DefinitionError, DefinitionResult};
pub use id_generator::{get_seed, IDGenerator};
pub use serializer::{encode_literal, serialize, serialize_token};
pub use tokenizer::{decode_literal, decode_params, split_pieces, tokenize, Piece, TokenMatch};
