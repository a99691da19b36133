//! Error types for pipshell-pkg

use pipshell_exec::ExecError;
use thiserror::Error;

/// Errors that can occur during package operations
#[derive(Error, Debug, Clone)]
pub enum PackageError {
    /// Running the package manager failed
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Command ran but reported failure
    #[error("command failed: {status} - {message}")]
    CommandFailed {
        /// Exit status
        status: i32,
        /// Error message
        message: String,
    },

    /// Output did not have the expected shape
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },

    /// Package not found in the registry
    #[error("package not found: {0}")]
    PackageNotFound(String),

    /// Install command ran but the package is still missing
    #[error("failed to install {name}: {message}")]
    InstallFailed {
        /// Package name
        name: String,
        /// Captured stderr
        message: String,
    },

    /// Uninstall command ran but the package is still present
    #[error("failed to uninstall {name}: {message}")]
    UninstallFailed {
        /// Package name
        name: String,
        /// Captured stderr
        message: String,
    },

    /// Insufficient permissions on the target environment
    #[error("insufficient permissions: {0}")]
    PermissionDenied(String),

    /// Local environment could not be inspected
    #[error("environment error: {0}")]
    Environment(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl PackageError {
    /// Check if the package manager could not be launched at all
    #[must_use]
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, PackageError::Exec(ExecError::NotFound { .. }))
    }
}
