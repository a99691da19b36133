//! Error types for pipshell-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a child process
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The program does not exist or is not on `PATH`
    #[error("command not found: {command}")]
    NotFound {
        /// Full command line
        command: String,
    },

    /// The program exists but could not be started
    #[error("failed to spawn `{command}`: {message}")]
    Spawn {
        /// Full command line
        command: String,
        /// OS error message
        message: String,
    },

    /// The process did not finish within its time budget and was killed
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout {
        /// Full command line
        command: String,
        /// Timeout that was exceeded
        timeout: Duration,
        /// Wall-clock time until the kill completed
        elapsed: Duration,
        /// Return code observed after the kill, if any
        return_code: Option<i32>,
        /// stdout read before the kill
        stdout: String,
        /// stderr read before the kill
        stderr: String,
    },

    /// The process ran to completion with a non-zero return code
    #[error("`{command}` exited with non-zero status {return_code}: {stderr}")]
    NonZeroExit {
        /// Full command line
        command: String,
        /// Normalized return code
        return_code: i32,
        /// Captured stdout
        stdout: String,
        /// Captured stderr
        stderr: String,
    },

    /// I/O error while talking to the child
    #[error("I/O error running `{command}`: {message}")]
    Io {
        /// Full command line
        command: String,
        /// Error message
        message: String,
    },

    /// The invocation itself is unusable
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),
}

/// Observable failure categories of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    LaunchNotFound,
    Timeout,
    NonZeroExit,
    Other,
}

impl FailureKind {
    /// Label used in the `category` log field
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::LaunchNotFound => "launch_not_found",
            FailureKind::Timeout => "timeout",
            FailureKind::NonZeroExit => "non_zero_exit",
            FailureKind::Other => "other",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExecError {
    /// Failure category of this error
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ExecError::NotFound { .. } => FailureKind::LaunchNotFound,
            ExecError::Timeout { .. } => FailureKind::Timeout,
            ExecError::NonZeroExit { .. } => FailureKind::NonZeroExit,
            _ => FailureKind::Other,
        }
    }

    /// Whether a caller could have asked for this failure to be reported
    /// through the result instead of an error
    #[must_use]
    pub fn is_suppressible(&self) -> bool {
        matches!(self, ExecError::NonZeroExit { .. })
    }

    /// Command line the error refers to, if any
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            ExecError::NotFound { command }
            | ExecError::Spawn { command, .. }
            | ExecError::Timeout { command, .. }
            | ExecError::NonZeroExit { command, .. }
            | ExecError::Io { command, .. } => Some(command),
            ExecError::InvalidInvocation(_) => None,
        }
    }
}
