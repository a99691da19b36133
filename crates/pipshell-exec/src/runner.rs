//! Single-use child process runner built on `tokio::process`

use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};

use crate::error::{ExecError, FailureKind};
use crate::invocation::Invocation;
use crate::result::ExecutionResult;

#[cfg(windows)]
const SHELL: (&str, &str) = ("cmd", "/C");
#[cfg(not(windows))]
const SHELL: (&str, &str) = ("sh", "-c");

/// Runs exactly one [`Invocation`]
///
/// `run` consumes the runner, so each instance spawns at most one child.
/// The child is killed if the runner is dropped mid-flight.
#[derive(Debug)]
pub struct ProcessRunner {
    invocation: Invocation,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(invocation: Invocation) -> Self {
        Self { invocation }
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    fn command(&self) -> Command {
        let inv = &self.invocation;
        let mut cmd = if inv.shell() {
            let mut cmd = Command::new(SHELL.0);
            cmd.arg(SHELL.1).arg(inv.command_line());
            cmd
        } else {
            let mut cmd = Command::new(inv.program());
            cmd.args(&inv.args()[1..]);
            cmd
        };
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Captured bytes as text with `\n` line endings
    ///
    /// Invalid UTF-8 is replaced, and the invocation's line separator is
    /// folded into `\n`.
    fn decode(&self, bytes: &[u8]) -> String {
        let text = String::from_utf8_lossy(bytes);
        match self.invocation.line_separator() {
            "\n" => text.into_owned(),
            separator => text.replace(separator, "\n"),
        }
    }

    fn spawn(&self) -> Result<Child, ExecError> {
        let command = self.invocation.command_line();
        self.command().spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                error!(
                    command = %command,
                    category = FailureKind::LaunchNotFound.as_str(),
                    "command not found"
                );
                ExecError::NotFound { command }
            } else {
                error!(
                    command = %command,
                    category = FailureKind::Other.as_str(),
                    error = %e,
                    "failed to spawn process"
                );
                ExecError::Spawn {
                    command,
                    message: e.to_string(),
                }
            }
        })
    }

    /// Spawn the child, feed it `stdin`, and wait for it within the timeout
    ///
    /// With `raise_on_error` a non-zero return code becomes
    /// [`ExecError::NonZeroExit`]; without it the returned result is marked
    /// `failed`. Launch failures and timeouts are always errors.
    ///
    /// # Errors
    /// Returns [`ExecError::NotFound`] if the program is missing,
    /// [`ExecError::Timeout`] if the child had to be killed, and
    /// [`ExecError::NonZeroExit`] as described above.
    #[instrument(skip(self, stdin), fields(command = %self.invocation), level = "debug")]
    pub async fn run(
        self,
        stdin: Option<&str>,
        raise_on_error: bool,
    ) -> Result<ExecutionResult, ExecError> {
        let command = self.invocation.command_line();
        let limit = self.invocation.timeout();
        let start = Instant::now();

        debug!(
            timeout = ?limit,
            shell = self.invocation.shell(),
            encoding = self.invocation.encoding(),
            "spawning process"
        );

        let mut child = self.spawn()?;
        let pid = child.id();

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let outcome = timeout(
            limit,
            communicate(&mut child, stdin, &mut stdout, &mut stderr),
        )
        .await;

        let status = match outcome {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                error!(
                    command = %command,
                    category = FailureKind::Other.as_str(),
                    error = %e,
                    "I/O error while waiting for process"
                );
                return Err(ExecError::Io {
                    command,
                    message: e.to_string(),
                });
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!(command = %command, error = %e, "failed to kill timed out process");
                }
                let return_code = child.wait().await.ok().and_then(|s| s.code());
                let elapsed = start.elapsed();
                let stdout = self.decode(&stdout);
                let stderr = self.decode(&stderr);
                error!(
                    command = %command,
                    category = FailureKind::Timeout.as_str(),
                    timeout = ?limit,
                    elapsed = ?elapsed,
                    return_code = ?return_code,
                    stderr = %stderr,
                    "command timed out"
                );
                return Err(ExecError::Timeout {
                    command,
                    timeout: limit,
                    elapsed,
                    return_code,
                    stdout,
                    stderr,
                });
            }
        };

        let result = ExecutionResult::from_status(
            command.clone(),
            pid,
            status.code(),
            self.decode(&stdout),
            self.decode(&stderr),
            start.elapsed(),
        );

        if !result.failed {
            debug!(
                pid = ?pid,
                status = result.return_code,
                duration = ?result.duration,
                "command completed"
            );
            return Ok(result);
        }

        if raise_on_error {
            error!(
                command = %command,
                category = FailureKind::NonZeroExit.as_str(),
                status = result.return_code,
                stderr = %result.stderr,
                "command exited with non-zero status"
            );
            return Err(ExecError::NonZeroExit {
                command,
                return_code: result.return_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }

        warn!(
            command = %command,
            category = FailureKind::NonZeroExit.as_str(),
            status = result.return_code,
            stderr = %result.stderr,
            "command exited with non-zero status"
        );
        Ok(result)
    }
}

/// Write stdin and drain both output pipes while waiting for exit
///
/// Output lands in the caller's buffers as it arrives, so whatever was read
/// survives if this future is dropped on timeout.
async fn communicate(
    child: &mut Child,
    input: Option<&str>,
    out: &mut Vec<u8>,
    err: &mut Vec<u8>,
) -> std::io::Result<ExitStatus> {
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let write = async move {
        if let Some(mut pipe) = stdin
            && let Some(input) = input
        {
            // The child may exit without reading its input.
            match pipe.write_all(input.as_bytes()).await {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }
        Ok(())
    };

    let (written, read_out, read_err, status) = tokio::join!(
        write,
        read_pipe(stdout, out),
        read_pipe(stderr, err),
        child.wait()
    );
    written?;
    read_out?;
    read_err?;
    status
}

async fn read_pipe<R: AsyncRead + Unpin>(
    pipe: Option<R>,
    buf: &mut Vec<u8>,
) -> std::io::Result<()> {
    if let Some(mut pipe) = pipe {
        while pipe.read_buf(buf).await? > 0 {}
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use super::*;

    fn runner(args: &[&str]) -> ProcessRunner {
        ProcessRunner::new(Invocation::new(args.iter().copied()).unwrap())
    }

    #[tokio::test]
    async fn test_run_success() {
        let result = runner(&["echo", "hello"]).run(None, true).await.unwrap();

        assert!(result.success());
        assert!(!result.failed);
        assert_eq!(result.return_code, 0);
        assert_eq!(result.status_code, Some(0));
        assert!(result.pid.is_some());
        assert_eq!(result.stdout_lines(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_non_zero_exit_raises() {
        let err = runner(&["sh", "-c", "echo partial; echo oops >&2; exit 42"])
            .run(None, true)
            .await
            .unwrap_err();

        match err {
            ExecError::NonZeroExit {
                command,
                return_code,
                stdout,
                stderr,
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(return_code, 42);
                assert_eq!(stdout.trim(), "partial");
                assert_eq!(stderr.trim(), "oops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_zero_exit_suppressed() {
        let result = runner(&["sh", "-c", "exit 3"])
            .run(None, false)
            .await
            .unwrap();

        assert!(result.failed);
        assert!(!result.success());
        assert_eq!(result.return_code, 3);
    }

    #[tokio::test]
    async fn test_missing_program_always_raises() {
        for raise in [true, false] {
            let err = runner(&["pipshell-definitely-not-a-program"])
                .run(None, raise)
                .await
                .unwrap_err();
            assert!(matches!(err, ExecError::NotFound { .. }));
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let invocation = Invocation::new(["sleep", "5"])
            .unwrap()
            .with_timeout(Duration::from_millis(100))
            .unwrap();
        let start = Instant::now();

        let err = ProcessRunner::new(invocation)
            .run(None, false)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_timeout_keeps_partial_output() {
        let invocation = Invocation::new(["sh", "-c", "echo begun; echo started >&2; sleep 5"])
            .unwrap()
            .with_timeout(Duration::from_millis(500))
            .unwrap();

        let err = ProcessRunner::new(invocation)
            .run(None, false)
            .await
            .unwrap_err();

        match err {
            ExecError::Timeout { stdout, stderr, .. } => {
                assert_eq!(stdout.trim(), "begun");
                assert_eq!(stderr.trim(), "started");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_replaces_invalid_utf8() {
        let runner = runner(&["true"]);
        assert_eq!(runner.decode(b"caf\xe9\n"), "caf\u{fffd}\n");
    }

    #[tokio::test]
    async fn test_stdin_is_forwarded() {
        let result = runner(&["cat"])
            .run(Some("foo==1.0\nbar==2.0\n"), true)
            .await
            .unwrap();

        assert_eq!(result.stdout, "foo==1.0\nbar==2.0\n");
    }

    #[tokio::test]
    async fn test_unread_stdin_is_ignored() {
        let input = "x".repeat(1 << 20);
        let result = runner(&["true"]).run(Some(&input), true).await.unwrap();

        assert!(result.success());
    }

    #[tokio::test]
    async fn test_shell_mode() {
        let invocation = Invocation::new(["echo", "$((1 + 2))"])
            .unwrap()
            .with_shell(true);

        let result = ProcessRunner::new(invocation).run(None, true).await.unwrap();

        assert_eq!(result.stdout.trim(), "3");
    }

    #[tokio::test]
    async fn test_argv_is_not_shell_interpreted() {
        let result = runner(&["echo", "$HOME"]).run(None, true).await.unwrap();

        assert_eq!(result.stdout.trim(), "$HOME");
    }
}
