use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Library file path, relative to the project
    #[arg(short, long, default_value = "blocks.json")]
    pub library_path: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing blockprompt project...".bright_blue().bold());

    let config = Config {
        library_path: args.library_path.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let library_path = config.get_library_path(cwd);
    if !library_path.exists() || args.force {
        if let Some(parent) = library_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&library_path, "[]\n")?;
        println!("  {} Created {}", "✓".green(), args.library_path);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: blockprompt library add <id> <name> --param speed:number:1");
    println!("  2. Run: blockprompt flatten \"Intro [[Block:<id>]]\"");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_library() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        init(
            InitArgs {
                library_path: "lib/blocks.json".into(),
                force: false,
            },
            &cwd,
        )
        .unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.library_path, "lib/blocks.json");
        let library = fs::read_to_string(dir.path().join("lib/blocks.json")).unwrap();
        assert_eq!(library.trim(), "[]");
    }
}
