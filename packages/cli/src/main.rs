mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    flatten, init, library, parse, render, FlattenArgs, InitArgs, LibraryArgs, ParseArgs,
    RenderArgs,
};
use tracing_subscriber::EnvFilter;

/// blockprompt - compose prompts from reusable, parameterized blocks
#[derive(Parser, Debug)]
#[command(name = "blockprompt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new blockprompt project
    Init(InitArgs),

    /// Manage block definitions
    Library(LibraryArgs),

    /// Parse a prompt into segments
    Parse(ParseArgs),

    /// Render a prompt into token widgets
    Render(RenderArgs),

    /// Build the generation request for a prompt
    Flatten(FlattenArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Library(args) => library(args, &cwd),
        Command::Parse(args) => parse(args, &cwd),
        Command::Render(args) => render(args, &cwd),
        Command::Flatten(args) => flatten(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
