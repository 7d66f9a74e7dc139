//! # blockprompt evaluator
//!
//! Rich view rendering for composite prompts: token widgets, display colors,
//! and an HTML projection for contenteditable-style surfaces.

pub mod color;
pub mod evaluator;
pub mod utils;
pub mod vdom;

pub use color::{block_hue, DisplayColor, RenderOptions};
pub use evaluator::{render, Evaluator};
pub use utils::{escape_attr, escape_text, fallback_label};
pub use vdom::{RichNode, RichView, TokenWidget};
