use super::read_prompt;
use crate::config::Config;
use anyhow::Result;
use blockprompt_common::BlockLibrary;
use blockprompt_compiler_request::{build_request_from_string, RequestOptions};
use clap::Args;

#[derive(Debug, Args)]
pub struct FlattenArgs {
    /// Prompt text, or `-` to read stdin
    pub prompt: String,

    /// Omit rendered parameter explanations
    #[arg(long)]
    pub no_explain: bool,

    /// Omit project data attached to definitions
    #[arg(long)]
    pub no_project: bool,
}

pub fn flatten(args: FlattenArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let library = BlockLibrary::load(&config.store(cwd))?;
    let source = read_prompt(&args.prompt)?;

    let options = RequestOptions {
        include_explanations: !args.no_explain,
        include_project: !args.no_project,
        ..RequestOptions::default()
    };

    let request = build_request_from_string(&source, &library, &options)?;
    println!("{}", request.to_json()?);
    Ok(())
}
