use blockprompt_common::JsonFileStore;
use blockprompt_evaluator::RenderOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "blockprompt.config.json";

/// blockprompt configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// JSON file holding the block library
    #[serde(default = "default_library_path")]
    pub library_path: String,

    /// Project data attached to blocks added from the command line
    #[serde(default)]
    pub project: Value,

    /// Token widget colors
    #[serde(default)]
    pub render: RenderOptions,
}

fn default_library_path() -> String {
    "blocks.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Absolute path to the library file
    pub fn get_library_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.library_path)
    }

    pub fn store(&self, cwd: &str) -> JsonFileStore {
        JsonFileStore::new(self.get_library_path(cwd))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            project: Value::Null,
            render: RenderOptions::default(),
        }
    }
}
