//! Result types for command execution

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Return code recorded when the child exposes none (e.g. killed by a signal)
pub const MISSING_RETURN_CODE: i32 = 1;

/// Result of a completed command execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Command line that was run
    pub command: String,
    /// Process id of the child
    pub pid: Option<u32>,
    /// Exit code exactly as reported by the OS, `None` if there was none
    pub status_code: Option<i32>,
    /// Normalized return code
    pub return_code: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// True when the return code is non-zero or was missing
    pub failed: bool,
    /// Time taken to execute
    pub duration: Duration,
}

impl ExecutionResult {
    /// Build a result from the raw exit code, normalizing a missing code
    #[must_use]
    pub fn from_status(
        command: impl Into<String>,
        pid: Option<u32>,
        status_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        let return_code = status_code.unwrap_or(MISSING_RETURN_CODE);
        Self {
            command: command.into(),
            pid,
            status_code,
            return_code,
            stdout,
            stderr,
            failed: status_code.is_none() || return_code != 0,
            duration,
        }
    }

    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        !self.failed
    }

    /// stdout split into lines, each trimmed on both sides
    #[must_use]
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().map(str::trim).collect()
    }

    /// Combine stdout and stderr
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}
