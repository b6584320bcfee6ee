use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from loading or creating the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize default config")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings read once at startup. The shell only ever reads this structure;
/// editing the file takes effect on the next run.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wrap listing output in ANSI colors.
    pub use_colors: bool,
    /// Maximum number of lines kept in the command history.
    pub history_size: usize,
    /// Whole-command shorthands, substituted once and never recursively.
    pub aliases: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut aliases = HashMap::new();
        aliases.insert("ls".to_string(), "list".to_string());
        aliases.insert("dir".to_string(), "list".to_string());
        aliases.insert("rm".to_string(), "del".to_string());

        Self {
            use_colors: true,
            history_size: 10,
            aliases,
        }
    }
}

impl Config {
    /// Load the config from `path`, creating the file with documented
    /// defaults when it does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
        } else {
            debug!("config file {} absent, writing defaults", path.display());
            let config = Self::default();
            let raw = toml::to_string_pretty(&config)?;
            std::fs::write(path, raw).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(config)
        }
    }
}
