use super::read_prompt;
use crate::config::Config;
use anyhow::Result;
use blockprompt_common::BlockLibrary;
use blockprompt_evaluator::{Evaluator, RichNode, RichView};
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Prompt text, or `-` to read stdin
    pub prompt: String,

    /// Print the contenteditable HTML projection
    #[arg(long)]
    pub html: bool,

    /// Print the rendered nodes as JSON
    #[arg(long, conflicts_with = "html")]
    pub json: bool,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let library = BlockLibrary::load(&config.store(cwd))?;
    let source = read_prompt(&args.prompt)?;

    let view = Evaluator::with_options(config.render).render(&source, &library);

    if args.html {
        println!("{}", view.to_html());
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_view(view: &RichView) {
    for node in &view.nodes {
        match node {
            RichNode::Text { content } => {
                if !content.is_empty() {
                    println!("  {} {:?}", "text ".dimmed(), content);
                }
            }
            RichNode::Token(widget) => {
                let label = if widget.resolved {
                    widget.label.bold()
                } else {
                    widget.label.red().bold()
                };
                println!(
                    "  {} {} {} {}",
                    format!("#{:<4}", widget.index).cyan(),
                    label,
                    format!("hue {}", widget.color.hue).dimmed(),
                    widget.raw.dimmed()
                );
            }
        }
    }
    println!();
    println!("{} {} blocks", "✓".green(), view.token_count());
}
