use crate::color::DisplayColor;
use crate::utils::{escape_attr, escape_text};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Opaque, non-text-editable widget standing in for one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenWidget {
    /// The token's exact original substring, reinserted verbatim on sync
    pub raw: String,
    /// Sequential position among all tokens of the rendered string
    pub index: usize,
    pub block_id: String,
    pub label: String,
    pub color: DisplayColor,
    /// Whether the block resolved to a definition (and can be opened for editing)
    pub resolved: bool,
}

/// Display node of the rich editing surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RichNode {
    /// Freely editable text run
    Text { content: String },

    /// Token widget
    Token(TokenWidget),
}

impl RichNode {
    pub fn text(content: impl Into<String>) -> Self {
        RichNode::Text {
            content: content.into(),
        }
    }

    /// Text this node contributes to the canonical string
    pub fn source_text(&self) -> &str {
        match self {
            RichNode::Text { content } => content,
            RichNode::Token(widget) => &widget.raw,
        }
    }

    pub fn as_token(&self) -> Option<&TokenWidget> {
        match self {
            RichNode::Token(widget) => Some(widget),
            RichNode::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RichNode::Text { .. })
    }
}

/// Rendered tree of a token-annotated string
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RichView {
    pub nodes: Vec<RichNode>,
}

impl RichView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<RichNode>) -> Self {
        Self { nodes }
    }

    pub fn add_node(&mut self, node: RichNode) {
        self.nodes.push(node);
    }

    /// Reconstruct the canonical string: text runs as-is, widgets as their
    /// original substring (never their label)
    pub fn plain_representation(&self) -> String {
        self.nodes.iter().map(RichNode::source_text).collect()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenWidget> {
        self.nodes.iter().filter_map(RichNode::as_token)
    }

    pub fn token(&self, index: usize) -> Option<&TokenWidget> {
        self.tokens().find(|w| w.index == index)
    }

    pub fn token_count(&self) -> usize {
        self.tokens().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// HTML fragment for an editable surface
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for node in &self.nodes {
            match node {
                RichNode::Text { content } => html.push_str(&escape_text(content)),
                RichNode::Token(widget) => {
                    let _ = write!(
                        html,
                        r#"<span class="block-token" contenteditable="false" data-token="{}" data-index="{}" data-block-id="{}" data-editable="{}" style="background-color: {}; border-color: {}">{}</span>"#,
                        escape_attr(&widget.raw),
                        widget.index,
                        escape_attr(&widget.block_id),
                        widget.resolved,
                        widget.color.background_css(),
                        widget.color.border_css(),
                        escape_text(&widget.label),
                    );
                }
            }
        }
        html
    }
}
