//! Immutable description of one command to run

use std::time::Duration;

use crate::error::ExecError;

/// Timeout used when the caller does not pick one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(windows)]
const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEPARATOR: &str = "\n";

/// A command to execute: argument vector plus execution settings
///
/// The first argument is the program. Shell interpretation is off unless
/// [`Invocation::with_shell`] turns it on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<String>,
    timeout: Duration,
    shell: bool,
    encoding: &'static str,
    line_separator: &'static str,
}

impl Invocation {
    /// Create an invocation from an argument vector
    ///
    /// # Errors
    /// Returns [`ExecError::InvalidInvocation`] if `args` is empty or the
    /// program name is blank.
    pub fn new<I, S>(args: I) -> Result<Self, ExecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        match args.first() {
            None => Err(ExecError::InvalidInvocation(
                "argument vector is empty".to_string(),
            )),
            Some(program) if program.trim().is_empty() => Err(ExecError::InvalidInvocation(
                "program name is empty".to_string(),
            )),
            Some(_) => Ok(Self {
                args,
                timeout: DEFAULT_TIMEOUT,
                shell: false,
                encoding: "utf-8",
                line_separator: LINE_SEPARATOR,
            }),
        }
    }

    /// Set the wall-clock budget
    ///
    /// # Errors
    /// Returns [`ExecError::InvalidInvocation`] for a zero timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ExecError> {
        if timeout.is_zero() {
            return Err(ExecError::InvalidInvocation(
                "timeout must be positive".to_string(),
            ));
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Run the command line through the platform shell
    #[must_use]
    pub fn with_shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn program(&self) -> &str {
        &self.args[0]
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn shell(&self) -> bool {
        self.shell
    }

    /// Encoding captured output is decoded with
    ///
    /// Always `utf-8`; invalid sequences are replaced, never rejected.
    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    /// Platform line separator, folded into `\n` in captured output
    pub fn line_separator(&self) -> &'static str {
        self.line_separator
    }

    /// Arguments joined with single spaces, as shown in logs and errors
    #[must_use]
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.command_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_args() {
        let result = Invocation::new(Vec::<String>::new());
        assert!(matches!(result, Err(ExecError::InvalidInvocation(_))));

        let result = Invocation::new(["  "]);
        assert!(matches!(result, Err(ExecError::InvalidInvocation(_))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = Invocation::new(["pip"])
            .unwrap()
            .with_timeout(Duration::ZERO);
        assert!(matches!(result, Err(ExecError::InvalidInvocation(_))));
    }

    #[test]
    fn test_defaults() {
        let inv = Invocation::new(["pip", "list", "--format", "freeze"]).unwrap();

        assert_eq!(inv.program(), "pip");
        assert_eq!(inv.timeout(), DEFAULT_TIMEOUT);
        assert!(!inv.shell());
        assert_eq!(inv.encoding(), "utf-8");
        #[cfg(not(windows))]
        assert_eq!(inv.line_separator(), "\n");
        assert_eq!(inv.command_line(), "pip list --format freeze");
    }
}
