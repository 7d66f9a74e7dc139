//! Shared helpers for display text and HTML projection

/// Number of trailing id characters used in fallback labels
const FALLBACK_SUFFIX_LEN: usize = 4;

/// Escape a text run for display. Only `&`, `<` and `>` need escaping.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape a value placed inside a double-quoted attribute
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Label for a token whose block id has no definition
///
/// Examples:
/// - `fallback_label("blk_7f3a9c")` → `"Block 3a9c"`
/// - `fallback_label("ab")` → `"Block ab"`
pub fn fallback_label(block_id: &str) -> String {
    let count = block_id.chars().count();
    let tail: String = block_id
        .chars()
        .skip(count.saturating_sub(FALLBACK_SUFFIX_LEN))
        .collect();
    format!("Block {}", tail)
}
