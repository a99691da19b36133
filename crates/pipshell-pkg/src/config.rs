//! Configuration for the pip service

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PackageError;
use crate::types::InstallOptions;

/// How to invoke pip and where to look for installed packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipConfig {
    /// Program and leading arguments, e.g. `["python3", "-m", "pip"]`
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// Interpreter used to discover site-packages directories
    #[serde(default = "default_python")]
    pub python: String,
    /// Per-command timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Install with `--no-dependencies` unless told otherwise
    #[serde(default = "default_true")]
    pub no_dependencies: bool,
    /// Search the registry for a package before installing it
    #[serde(default = "default_true")]
    pub verify_registry: bool,
    /// site-packages directories; discovered from `python` when empty
    #[serde(default)]
    pub site_packages: Vec<PathBuf>,
}

fn default_command() -> Vec<String> {
    vec!["pip".to_string()]
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            python: default_python(),
            timeout_secs: default_timeout_secs(),
            no_dependencies: true,
            verify_registry: true,
            site_packages: Vec::new(),
        }
    }
}

impl PipConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings no pip command could run with
    ///
    /// # Errors
    /// Returns [`PackageError::ConfigError`] for an empty command or a zero
    /// timeout.
    pub fn validate(&self) -> Result<(), PackageError> {
        match self.command.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => return Err(PackageError::ConfigError("pip.command is empty".to_string())),
        }
        if self.timeout_secs == 0 {
            return Err(PackageError::ConfigError(
                "pip.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Install flags implied by this configuration
    #[must_use]
    pub fn install_options(&self) -> InstallOptions {
        InstallOptions {
            no_dependencies: self.no_dependencies,
            upgrade: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_table() {
        let config: PipConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipConfig::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.install_options().no_dependencies);
    }

    #[test]
    fn test_overrides() {
        let config: PipConfig = toml::from_str(
            r#"
            command = ["python3", "-m", "pip"]
            timeout_secs = 120
            verify_registry = false
            site_packages = ["/opt/venv/lib/python3.11/site-packages"]
            "#,
        )
        .unwrap();

        assert_eq!(config.command, vec!["python3", "-m", "pip"]);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert!(!config.verify_registry);
        assert!(config.no_dependencies);
        assert_eq!(config.site_packages.len(), 1);
    }

    #[test]
    fn test_validate() {
        assert!(PipConfig::default().validate().is_ok());

        let zero = PipConfig {
            timeout_secs: 0,
            ..PipConfig::default()
        };
        assert!(matches!(zero.validate(), Err(PackageError::ConfigError(_))));

        let empty: PipConfig = toml::from_str("command = []").unwrap();
        assert!(matches!(empty.validate(), Err(PackageError::ConfigError(_))));

        let blank: PipConfig = toml::from_str(r#"command = [" "]"#).unwrap();
        assert!(matches!(blank.validate(), Err(PackageError::ConfigError(_))));
    }
}
