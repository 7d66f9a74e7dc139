//! # Segments
//!
//! The structural counterpart of a token-annotated string: an alternating
//! list of text runs and block references.
//!
//! ## Invariants (restored by [`normalize`])
//!
//! - The list is never empty.
//! - It starts and ends with a text segment.
//! - No two text segments are adjacent; no two block segments are adjacent.
//!
//! Texts flanking a block may be empty. They exist so a caret can always land
//! before and after every block.

use blockprompt_parser::{
    serialize_token, split_pieces, DefinitionLookup, IDGenerator, ParamValues, Piece,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSegment {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSegment {
    pub id: String,
    pub block_id: String,
    #[serde(default)]
    pub values: ParamValues,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_url: Option<String>,

    /// Opaque attachment passed through to generation requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_data: Option<Value>,

    /// Original token text of a block whose definition was unknown when parsed.
    /// Emitted unchanged until the values are edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbatim: Option<String>,
}

impl BlockSegment {
    pub fn new(id: impl Into<String>, block_id: impl Into<String>, values: ParamValues) -> Self {
        Self {
            id: id.into(),
            block_id: block_id.into(),
            values,
            context_url: None,
            context_data: None,
            verbatim: None,
        }
    }

    /// Token text for this block
    pub fn to_token(&self, lookup: &dyn DefinitionLookup) -> String {
        match &self.verbatim {
            Some(raw) => raw.clone(),
            None => serialize_token(&self.block_id, &self.values, lookup.definition(&self.block_id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Segment {
    Text(TextSegment),
    Block(BlockSegment),
}

impl Segment {
    pub fn text(id: impl Into<String>, value: impl Into<String>) -> Self {
        Segment::Text(TextSegment {
            id: id.into(),
            value: value.into(),
        })
    }

    pub fn block(id: impl Into<String>, block_id: impl Into<String>, values: ParamValues) -> Self {
        Segment::Block(BlockSegment::new(id, block_id, values))
    }

    pub fn id(&self) -> &str {
        match self {
            Segment::Text(t) => &t.id,
            Segment::Block(b) => &b.id,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextSegment> {
        match self {
            Segment::Text(t) => Some(t),
            Segment::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockSegment> {
        match self {
            Segment::Block(b) => Some(b),
            Segment::Text(_) => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut BlockSegment> {
        match self {
            Segment::Block(b) => Some(b),
            Segment::Text(_) => None,
        }
    }

    /// Compare content, ignoring segment ids
    pub fn same_content(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Text(a), Segment::Text(b)) => a.value == b.value,
            (Segment::Block(a), Segment::Block(b)) => {
                a.block_id == b.block_id
                    && a.values == b.values
                    && a.context_url == b.context_url
                    && a.context_data == b.context_data
            }
            _ => false,
        }
    }
}

/// Compare two segment lists by content, ignoring ids
pub fn same_content(a: &[Segment], b: &[Segment]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
}

/// Restore the segment invariants.
///
/// Adjacent texts are merged (keeping the first id), empty texts are inserted
/// between adjacent blocks and at both ends, and an empty list becomes a single
/// empty text. Already-normalized lists pass through unchanged.
pub fn normalize(segments: Vec<Segment>, ids: &mut IDGenerator) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len() + 2);

    for segment in segments {
        match segment {
            Segment::Text(text) => match out.last_mut() {
                Some(Segment::Text(prev)) => prev.value.push_str(&text.value),
                _ => out.push(Segment::Text(text)),
            },
            Segment::Block(block) => {
                if !matches!(out.last(), Some(Segment::Text(_))) {
                    out.push(Segment::text(ids.new_id(), ""));
                }
                out.push(Segment::Block(block));
            }
        }
    }

    if !matches!(out.last(), Some(Segment::Text(_))) {
        out.push(Segment::text(ids.new_id(), ""));
    }

    out
}

/// Check the invariants [`normalize`] establishes
pub fn is_normalized(segments: &[Segment]) -> bool {
    !segments.is_empty()
        && segments.first().is_some_and(Segment::is_text)
        && segments.last().is_some_and(Segment::is_text)
        && segments.windows(2).all(|w| w[0].is_text() != w[1].is_text())
}

/// Build segments from a token-annotated string
pub fn from_string(source: &str, lookup: &dyn DefinitionLookup, ids: &mut IDGenerator) -> Vec<Segment> {
    let segments = split_pieces(source)
        .into_iter()
        .map(|piece| match piece {
            Piece::Text(text) => Segment::text(ids.new_id(), text),
            Piece::Token(token) => {
                let mut block = BlockSegment::new(ids.new_id(), token.block_id, token.params());
                if lookup.definition(token.block_id).is_none() {
                    block.verbatim = Some(token.raw.to_string());
                }
                Segment::Block(block)
            }
        })
        .collect();

    normalize(segments, ids)
}

/// Serialize segments to the canonical string
pub fn to_string(segments: &[Segment], lookup: &dyn DefinitionLookup) -> String {
    let mut output = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => output.push_str(&text.value),
            Segment::Block(block) => output.push_str(&block.to_token(lookup)),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockprompt_parser::{BlockDefinition, ParamDef, ParamType};
    use serde_json::json;

    fn defs() -> Vec<BlockDefinition> {
        vec![
            BlockDefinition::new("blk_a", "A")
                .with_param(ParamDef::new("color", "Color", ParamType::Color, "#000")),
            BlockDefinition::new("blk_b", "B")
                .with_param(ParamDef::new("speed", "Speed", ParamType::Number, 1)),
        ]
    }

    fn values(pairs: &[(&str, Value)]) -> ParamValues {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_basic_parse_example() {
        let mut ids = IDGenerator::default();
        let segments = from_string(r##"Intro [[Block:blk_a color="#fff"]] outro"##, &defs(), &mut ids);

        let expected = vec![
            Segment::text("", "Intro "),
            Segment::block("", "blk_a", values(&[("color", json!("#fff"))])),
            Segment::text("", " outro"),
        ];
        assert!(same_content(&segments, &expected));
    }

    #[test]
    fn test_normalize_merges_and_flanks() {
        let mut ids = IDGenerator::default();
        let raw = vec![
            Segment::block("b1", "blk_a", ParamValues::new()),
            Segment::block("b2", "blk_b", ParamValues::new()),
            Segment::text("t1", "x"),
            Segment::text("t2", "y"),
        ];

        let normalized = normalize(raw, &mut ids);
        assert!(is_normalized(&normalized));
        assert_eq!(normalized.len(), 5);
        assert_eq!(normalized[1].id(), "b1");
        assert_eq!(normalized[3].id(), "b2");
        assert_eq!(normalized[4].id(), "t1");
        assert_eq!(normalized[4].as_text().unwrap().value, "xy");
    }

    #[test]
    fn test_normalize_empty_list() {
        let mut ids = IDGenerator::default();
        let normalized = normalize(Vec::new(), &mut ids);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].as_text().unwrap().value, "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let mut ids = IDGenerator::default();
        let inputs = vec![
            vec![],
            vec![Segment::text("t", "a"), Segment::text("u", "b")],
            vec![
                Segment::block("b", "blk_a", ParamValues::new()),
                Segment::text("t", ""),
                Segment::text("u", ""),
                Segment::block("c", "x", ParamValues::new()),
            ],
        ];

        for input in inputs {
            let once = normalize(input, &mut ids);
            let twice = normalize(once.clone(), &mut ids);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_string_segment_equivalence() {
        let sources = [
            "",
            "plain text",
            r##"Intro [[Block:blk_a color="#fff"]] outro"##,
            "[[Block:blk_a]][[Block:blk_b speed=2.5]]",
            r#"[[Block:blk_b speed=3]] and [[Block:blk_a color="x y"]] end"#,
        ];

        for source in sources {
            let mut ids = IDGenerator::default();
            let segments = from_string(source, &defs(), &mut ids);
            assert!(is_normalized(&segments));
            assert_eq!(to_string(&segments, &defs()), source);
        }
    }

    #[test]
    fn test_from_string_of_to_string_is_normalize() {
        let mut ids = IDGenerator::default();
        let original = vec![
            Segment::block("b", "blk_b", values(&[("speed", json!(4))])),
            Segment::text("t", "mid"),
            Segment::text("u", "dle"),
        ];

        let source = to_string(&original, &defs());
        let reparsed = from_string(&source, &defs(), &mut ids);
        let normalized = normalize(original, &mut ids);

        assert!(same_content(&reparsed, &normalized));
    }

    #[test]
    fn test_unknown_block_round_trips_verbatim() {
        let mut ids = IDGenerator::default();
        let source = "see [[Block:gone   z=1  a=\"q\"]] here";
        let segments = from_string(source, &defs(), &mut ids);

        let block = segments[1].as_block().unwrap();
        assert_eq!(block.block_id, "gone");
        assert_eq!(block.values, values(&[("z", json!(1)), ("a", json!("q"))]));
        assert_eq!(to_string(&segments, &defs()), source);
    }

    #[test]
    fn test_segment_json_shape() {
        let segment = Segment::block("s1", "blk_a", values(&[("color", json!("#fff"))]));
        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["type"], json!("Block"));
        assert_eq!(json["blockId"], json!("blk_a"));
        assert!(json.get("contextUrl").is_none());
    }
}
