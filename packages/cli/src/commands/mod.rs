pub mod flatten;
pub mod init;
pub mod library;
pub mod parse;
pub mod render;

pub use flatten::{flatten, FlattenArgs};
pub use init::{init, InitArgs};
pub use library::{library, LibraryArgs};
pub use parse::{parse, ParseArgs};
pub use render::{render, RenderArgs};

use anyhow::Result;
use std::io::Read;

/// Prompt text from an argument, or from stdin when the argument is `-`
pub fn read_prompt(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        Ok(arg.to_string())
    }
}
