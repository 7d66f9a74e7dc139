//! # Editable Surface
//!
//! The sync engine talks to the rich editing widget through [`EditableBuffer`]
//! only. [`RichSurface`] is the in-memory implementation used by the CLI and
//! the tests; a UI toolkit implements the trait against its native widget.
//!
//! Caret positions are byte offsets into the surface's plain representation.
//! Token widgets are atomic: a caret never rests inside one.

use blockprompt_evaluator::{RichNode, RichView};

/// Capability the sync engine needs from a rich text widget
pub trait EditableBuffer {
    /// Reconstruct the canonical string: text runs verbatim, token widgets as
    /// their original substring
    fn plain_representation(&self) -> String;

    /// Insert plain text at the caret, or at the end of the content when there
    /// is no caret. Returns whether a caret was present.
    fn insert_at_cursor(&mut self, text: &str) -> bool;

    /// Replace the displayed content with a freshly rendered view
    fn replace_view(&mut self, view: RichView);

    fn caret(&self) -> Option<usize>;

    fn set_caret(&mut self, offset: Option<usize>);
}

/// In-memory rich text surface
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichSurface {
    nodes: Vec<RichNode>,
    caret: Option<usize>,
}

impl RichSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[RichNode] {
        &self.nodes
    }

    /// Total length of the plain representation in bytes
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| n.source_text().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the caret, snapping it onto a valid position
    pub fn place_caret(&mut self, offset: usize) {
        self.caret = Some(self.snap(offset));
    }

    /// Focus left the surface
    pub fn blur(&mut self) {
        self.caret = None;
    }

    /// Simulate the user typing at the caret (or the end)
    pub fn type_text(&mut self, text: &str) {
        self.insert_at_cursor(text);
    }

    /// Simulate backspace. A token directly before the caret is removed whole.
    /// Returns false when there was nothing to delete.
    pub fn delete_backward(&mut self) -> bool {
        let caret = match self.caret {
            Some(caret) if caret > 0 => self.snap(caret),
            _ => return false,
        };

        let mut start = 0;
        for i in 0..self.nodes.len() {
            let end = start + self.nodes[i].source_text().len();
            if caret > start && caret <= end {
                if let RichNode::Text { content } = &mut self.nodes[i] {
                    let local = caret - start;
                    let prev = content[..local]
                        .char_indices()
                        .next_back()
                        .map(|(idx, _)| idx)
                        .unwrap_or(0);
                    content.replace_range(prev..local, "");
                    self.caret = Some(start + prev);
                } else {
                    self.nodes.remove(i);
                    self.caret = Some(start);
                }
                self.tidy();
                return true;
            }
            start = end;
        }

        false
    }

    /// Nearest valid caret position at or after `offset`, clamped to the end
    fn snap(&self, offset: usize) -> usize {
        let mut start = 0;
        for node in &self.nodes {
            let end = start + node.source_text().len();
            if offset < end {
                return match node {
                    RichNode::Token(_) if offset > start => end,
                    RichNode::Token(_) => start,
                    RichNode::Text { content } => {
                        let mut local = offset - start;
                        while !content.is_char_boundary(local) {
                            local += 1;
                        }
                        start + local
                    }
                };
            }
            start = end;
        }
        start
    }

    fn insert_text_at(&mut self, offset: usize, text: &str) {
        let mut start = 0;
        for i in 0..self.nodes.len() {
            let len = self.nodes[i].source_text().len();
            let is_text = self.nodes[i].is_text();

            if is_text && offset <= start + len {
                if let RichNode::Text { content } = &mut self.nodes[i] {
                    content.insert_str(offset - start, text);
                }
                return;
            }
            if !is_text && offset == start {
                self.nodes.insert(i, RichNode::text(text));
                return;
            }
            start += len;
        }
        self.nodes.push(RichNode::text(text));
    }

    /// Drop empty text runs and merge neighbouring ones
    fn tidy(&mut self) {
        let nodes = std::mem::take(&mut self.nodes);
        for node in nodes {
            match node {
                RichNode::Text { content } if content.is_empty() => {}
                RichNode::Text { content } => match self.nodes.last_mut() {
                    Some(RichNode::Text { content: prev }) => prev.push_str(&content),
                    _ => self.nodes.push(RichNode::Text { content }),
                },
                token => self.nodes.push(token),
            }
        }
    }
}

impl EditableBuffer for RichSurface {
    fn plain_representation(&self) -> String {
        self.nodes.iter().map(RichNode::source_text).collect()
    }

    fn insert_at_cursor(&mut self, text: &str) -> bool {
        let (offset, focused) = match self.caret {
            Some(caret) => (self.snap(caret), true),
            None => (self.len(), false),
        };

        self.insert_text_at(offset, text);
        self.tidy();
        if focused {
            self.caret = Some(offset + text.len());
        }
        focused
    }

    fn replace_view(&mut self, view: RichView) {
        self.nodes = view.nodes;
        self.tidy();
        if let Some(caret) = self.caret {
            self.caret = Some(self.snap(caret));
        }
    }

    fn caret(&self) -> Option<usize> {
        self.caret
    }

    fn set_caret(&mut self, offset: Option<usize>) {
        self.caret = offset.map(|offset| self.snap(offset));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockprompt_evaluator::render;
    use blockprompt_parser::BlockDefinition;

    fn surface(source: &str) -> RichSurface {
        let defs = vec![BlockDefinition::new("blk_a", "A")];
        let mut surface = RichSurface::new();
        surface.replace_view(render(source, &defs));
        surface
    }

    #[test]
    fn test_type_at_caret() {
        let mut s = surface("ab[[Block:blk_a]]cd");
        s.place_caret(1);
        s.type_text("X");
        assert_eq!(s.plain_representation(), "aXb[[Block:blk_a]]cd");
        assert_eq!(s.caret(), Some(2));
    }

    #[test]
    fn test_type_without_caret_appends() {
        let mut s = surface("ab[[Block:blk_a]]");
        assert!(!s.insert_at_cursor("!"));
        assert_eq!(s.plain_representation(), "ab[[Block:blk_a]]!");
        assert_eq!(s.caret(), None);
    }

    #[test]
    fn test_caret_snaps_out_of_tokens() {
        let mut s = surface("ab[[Block:blk_a]]cd");
        s.place_caret(5);
        assert_eq!(s.caret(), Some(17));

        s.place_caret(2);
        s.type_text("-");
        assert_eq!(s.plain_representation(), "ab-[[Block:blk_a]]cd");

        s.place_caret(100);
        assert_eq!(s.caret(), Some(s.len()));
    }

    #[test]
    fn test_typing_between_adjacent_tokens() {
        let mut s = surface("[[Block:blk_a]][[Block:blk_a]]");
        s.place_caret(15);
        s.type_text(" and ");
        assert_eq!(s.plain_representation(), "[[Block:blk_a]] and [[Block:blk_a]]");
        assert_eq!(s.nodes().len(), 3);
    }

    #[test]
    fn test_delete_backward_removes_whole_token() {
        let mut s = surface("ab[[Block:blk_a]]cd");
        s.place_caret(17);
        assert!(s.delete_backward());
        assert_eq!(s.plain_representation(), "abcd");
        assert_eq!(s.nodes().len(), 1);
        assert_eq!(s.caret(), Some(2));

        assert!(s.delete_backward());
        assert_eq!(s.plain_representation(), "acd");
    }

    #[test]
    fn test_delete_multibyte_char() {
        let mut s = surface("añ");
        s.place_caret(3);
        assert!(s.delete_backward());
        assert_eq!(s.plain_representation(), "a");

        s.place_caret(0);
        assert!(!s.delete_backward());
    }
}
