//! # Rich View Renderer
//!
//! Projects a token-annotated string into display nodes: plain text runs for
//! the text between tokens and one opaque widget per token. Widgets remember
//! the token's exact substring and its position among all tokens, so the
//! surface can be turned back into the same string and edits can find the
//! token they target.

use crate::color::{DisplayColor, RenderOptions};
use crate::utils::fallback_label;
use crate::vdom::{RichNode, RichView, TokenWidget};
use blockprompt_parser::{split_pieces, DefinitionLookup, Piece};
use tracing::{debug, instrument};

/// Renders canonical strings into [`RichView`]s
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    pub options: RenderOptions,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    #[instrument(skip(self, source, lookup), fields(len = source.len()))]
    pub fn render(&self, source: &str, lookup: &dyn DefinitionLookup) -> RichView {
        let mut view = RichView::new();
        let mut index = 0;

        for piece in split_pieces(source) {
            match piece {
                Piece::Text("") => {}
                Piece::Text(text) => view.add_node(RichNode::text(text)),
                Piece::Token(token) => {
                    let definition = lookup.definition(token.block_id);
                    let label = match definition {
                        Some(def) => def.name.clone(),
                        None => {
                            debug!(block_id = %token.block_id, "Rendering token for unknown block");
                            fallback_label(token.block_id)
                        }
                    };

                    view.add_node(RichNode::Token(TokenWidget {
                        raw: token.raw.to_string(),
                        index,
                        block_id: token.block_id.to_string(),
                        label,
                        color: DisplayColor::for_block(
                            token.block_id,
                            definition.and_then(|d| d.color_seed),
                            &self.options,
                        ),
                        resolved: definition.is_some(),
                    }));
                    index += 1;
                }
            }
        }

        view
    }
}

/// Render with default options
pub fn render(source: &str, lookup: &dyn DefinitionLookup) -> RichView {
    Evaluator::new().render(source, lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::block_hue;
    use blockprompt_parser::{BlockDefinition, ParamDef, ParamType};

    fn defs() -> Vec<BlockDefinition> {
        vec![
            BlockDefinition::new("blk_a", "Glow")
                .with_param(ParamDef::new("color", "Color", ParamType::Color, "#000")),
            BlockDefinition::new("blk_b", "Bounce").with_color_seed(42),
        ]
    }

    #[test]
    fn test_render_text_and_tokens() {
        let source = r##"Intro [[Block:blk_a color="#fff"]] then [[Block:blk_b]]"##;
        let view = render(source, &defs());

        assert_eq!(view.nodes.len(), 4);
        assert_eq!(view.nodes[0], RichNode::text("Intro "));

        let first = view.nodes[1].as_token().unwrap();
        assert_eq!(first.raw, r##"[[Block:blk_a color="#fff"]]"##);
        assert_eq!(first.index, 0);
        assert_eq!(first.label, "Glow");
        assert!(first.resolved);
        assert_eq!(first.color.hue, block_hue("blk_a", None));

        let second = view.nodes[3].as_token().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.color.hue, 42);

        assert_eq!(view.plain_representation(), source);
    }

    #[test]
    fn test_unknown_block_gets_fallback_label() {
        let view = render("x [[Block:gone_1234]]", &defs());
        let widget = view.nodes[1].as_token().unwrap();

        assert_eq!(widget.label, "Block 1234");
        assert!(!widget.resolved);
        assert_eq!(widget.raw, "[[Block:gone_1234]]");
    }

    #[test]
    fn test_no_empty_text_runs() {
        let view = render("[[Block:blk_a]][[Block:blk_b]]", &defs());
        assert_eq!(view.nodes.len(), 2);
        assert!(view.nodes.iter().all(|n| !n.is_text()));

        assert!(render("", &defs()).is_empty());
    }

    #[test]
    fn test_malformed_token_stays_text() {
        let view = render("[[Block:blk_a color=1", &defs());
        assert_eq!(view.nodes, vec![RichNode::text("[[Block:blk_a color=1")]);
    }

    #[test]
    fn test_render_options_apply() {
        let evaluator = Evaluator::with_options(RenderOptions {
            saturation: 50,
            lightness: 60,
        });
        let view = evaluator.render("[[Block:blk_b]]", &defs());
        let color = view.nodes[0].as_token().unwrap().color;
        assert_eq!(color.background_css(), "hsl(42, 50%, 60%)");
    }
}
