use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use blockprompt_common::{BlockLibrary, DefinitionStore, LibraryEntry};
use blockprompt_parser::{decode_literal, BlockDefinition, ParamDef, ParamType};
use clap::{Args, Subcommand};
use colored::Colorize;

#[derive(Debug, Args)]
pub struct LibraryArgs {
    #[command(subcommand)]
    pub command: LibraryCommand,
}

#[derive(Debug, Subcommand)]
pub enum LibraryCommand {
    /// List block definitions
    List {
        /// Print the raw library JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new block definition
    Add {
        id: String,
        name: String,

        /// Parameter as key:type:default[:explain], repeatable
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Explicit display hue
        #[arg(long)]
        color_seed: Option<u32>,
    },

    /// Append a parameter to an existing definition
    AppendParam {
        id: String,

        /// Parameter as key:type:default[:explain]
        param: String,

        /// Allowed values for select parameters, comma separated
        #[arg(long, value_delimiter = ',')]
        options: Vec<String>,
    },

    /// Remove a block definition
    Remove { id: String },
}

/// Parse `key:type:default[:explain]`. The default is read as a JSON literal,
/// falling back to a plain string.
pub fn parse_param_spec(spec: &str) -> Result<ParamDef> {
    let mut parts = spec.splitn(4, ':');
    let key = parts.next().filter(|k| !k.is_empty());
    let kind = parts.next();
    let default = parts.next();

    let (Some(key), Some(kind), Some(default)) = (key, kind, default) else {
        return Err(anyhow!("Invalid parameter {:?}, expected key:type:default", spec));
    };

    let kind: ParamType = serde_json::from_value(serde_json::Value::String(kind.to_string()))
        .with_context(|| format!("Unknown parameter type {:?}", kind))?;

    let mut param = ParamDef::new(key, key, kind, decode_literal(default));
    if let Some(explain) = parts.next() {
        param = param.with_explain(explain);
    }
    Ok(param)
}

pub fn library(args: LibraryArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = config.store(cwd);
    let mut library = BlockLibrary::load(&store)?;

    match args.command {
        LibraryCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&store.load()?)?);
            } else {
                print_library(&library);
            }
            return Ok(());
        }

        LibraryCommand::Add {
            id,
            name,
            params,
            color_seed,
        } => {
            let mut def = BlockDefinition::new(id, name);
            for spec in &params {
                def = def.with_param(parse_param_spec(spec)?);
            }
            def.color_seed = color_seed;

            let id = def.id.clone();
            library.insert(LibraryEntry::new(def, config.project.clone()))?;
            println!("  {} {} {}", "✓".green(), "Saved".bold(), id);
        }

        LibraryCommand::AppendParam { id, param, options } => {
            let param = parse_param_spec(&param)?.with_options(options);
            let key = param.key.clone();
            library.append_param(&id, param)?;
            println!("  {} Added {} to {}", "✓".green(), key.bold(), id);
        }

        LibraryCommand::Remove { id } => {
            if library.remove(&id).is_none() {
                return Err(anyhow!("Block not found: {}", id));
            }
            println!("  {} Removed {}", "✓".green(), id);
        }
    }

    library.save(&store)?;
    Ok(())
}

fn print_library(library: &BlockLibrary) {
    if library.is_empty() {
        println!("{}", "No blocks defined".yellow());
        return;
    }

    for def in library.definitions() {
        println!("{} {}", def.id.bright_white().bold(), format!("({})", def.name).dimmed());
        for param in &def.params {
            println!("    {} {} = {}", param.key, param.kind.as_str().cyan(), param.default);
        }
    }
}
