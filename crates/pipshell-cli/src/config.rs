//! Configuration loading and types

use std::path::{Path, PathBuf};

use pipshell_pkg::PipConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration, read from `pipshell.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// How pip is invoked
    #[serde(default)]
    pub pip: PipConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Find the configuration file to use
    ///
    /// An explicit path wins, then `PIPSHELL_CONFIG`, then `./pipshell.toml`,
    /// then `<config dir>/pipshell/pipshell.toml`.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var("PIPSHELL_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let candidates = [
            Some(PathBuf::from("pipshell.toml")),
            dirs::config_dir().map(|p| p.join("pipshell/pipshell.toml")),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}
