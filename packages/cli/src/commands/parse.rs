use super::read_prompt;
use crate::config::Config;
use anyhow::Result;
use blockprompt_common::BlockLibrary;
use blockprompt_editor::Composition;
use clap::Args;
use tracing::debug;

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Prompt text, or `-` to read stdin
    pub prompt: String,

    /// Re-serialize the segments instead of printing them
    #[arg(long)]
    pub canonical: bool,
}

pub fn parse(args: ParseArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let library = BlockLibrary::load(&config.store(cwd))?;
    let source = read_prompt(&args.prompt)?;

    let composition = Composition::from_string(&source, &library);
    debug!(segments = composition.len(), "Parsed prompt");

    if args.canonical {
        println!("{}", composition.to_source(&library));
    } else {
        println!("{}", serde_json::to_string_pretty(composition.segments())?);
    }
    Ok(())
}
