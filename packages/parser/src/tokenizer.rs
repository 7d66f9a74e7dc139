//! # Token Grammar
//!
//! Block references live inline in prompt text as
//!
//! ```text
//! [[Block:<id> <key>=<json-literal> <key>=<json-literal> ...]]
//! ```
//!
//! Scanning never fails: anything that is not a complete token stays literal
//! text. Parameter values are decoded one pair at a time, so a malformed
//! literal only affects its own key.

use crate::definition::ParamValues;
use regex::Regex;
use serde_json::Value;
use std::ops::Range;
use std::sync::OnceLock;

pub const TOKEN_OPEN: &str = "[[Block:";
pub const TOKEN_CLOSE: &str = "]]";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // The params run may contain single `]` but never `]]`.
    PATTERN.get_or_init(|| {
        Regex::new(r"\[\[Block:([A-Za-z0-9_-]+)((?:[^\]]|\][^\]])*)\]\]").unwrap()
    })
}

/// One token found in a source string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch<'src> {
    /// Byte offset of the opening `[[`
    pub start: usize,
    /// Byte offset just past the closing `]]`
    pub end: usize,
    pub block_id: &'src str,
    pub raw_params: &'src str,
    /// The complete token text, `source[start..end]`
    pub raw: &'src str,
}

impl<'src> TokenMatch<'src> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Decode this token's parameters
    pub fn params(&self) -> ParamValues {
        decode_params(self.raw_params)
    }
}

/// A run of a source string: literal text or a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'src> {
    Text(&'src str),
    Token(TokenMatch<'src>),
}

/// Find every token in `source`, leftmost first, non-overlapping
pub fn tokenize(source: &str) -> Vec<TokenMatch<'_>> {
    token_pattern()
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(TokenMatch {
                start: whole.start(),
                end: whole.end(),
                block_id: caps.get(1)?.as_str(),
                raw_params: caps.get(2).map_or("", |m| m.as_str()),
                raw: whole.as_str(),
            })
        })
        .collect()
}

/// Split `source` into alternating text and token pieces.
///
/// The result always starts and ends with a `Piece::Text` and never holds two
/// adjacent tokens; texts between adjacent tokens are empty strings.
pub fn split_pieces(source: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut cursor = 0;

    for token in tokenize(source) {
        pieces.push(Piece::Text(&source[cursor..token.start]));
        pieces.push(Piece::Token(token));
        cursor = token.end;
    }

    pieces.push(Piece::Text(&source[cursor..]));
    pieces
}

/// Decode the `key=value` pairs of a token's params run.
///
/// Pairs are separated by whitespace outside of JSON string literals. Each
/// right-hand side is decoded as JSON and kept as a raw string when that fails.
/// Pairs without `=` or with an empty key are ignored.
///
/// Unquoted values cannot hold whitespace: `title=Hello World` decodes to
/// `{"title": "Hello"}` and the stray `World` is dropped.
pub fn decode_params(raw_params: &str) -> ParamValues {
    let mut values = ParamValues::new();

    for pair in split_pairs(raw_params) {
        let Some((key, literal)) = pair.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        values.insert(key.to_string(), decode_literal(literal));
    }

    values
}

/// Decode one JSON literal, falling back to the raw text
pub fn decode_literal(literal: &str) -> Value {
    serde_json::from_str(literal).unwrap_or_else(|_| Value::String(literal.to_string()))
}

/// Split on whitespace, keeping double-quoted runs (with escapes) intact
fn split_pairs(raw: &str) -> Vec<&str> {
    let mut pairs = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c.is_whitespace() {
            if let Some(s) = start.take() {
                pairs.push(&raw[s..i]);
            }
            continue;
        }

        if start.is_none() {
            start = Some(i);
        }
        if c == '"' {
            in_string = true;
        }
    }

    if let Some(s) = start {
        pairs.push(&raw[s..]);
    }

    pairs
}
