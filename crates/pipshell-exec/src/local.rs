//! Local command execution using `tokio::process`

use async_trait::async_trait;
use tracing::instrument;

use crate::error::ExecError;
use crate::invocation::Invocation;
use crate::result::ExecutionResult;
use crate::runner::ProcessRunner;
use crate::traits::CommandExecutor;

/// Local command executor
///
/// Executes commands on the local machine, one fresh [`ProcessRunner`] per call.
#[derive(Debug, Clone)]
pub struct LocalExecutor;

impl LocalExecutor {
    /// Create a new local executor
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for LocalExecutor {
    #[instrument(skip(self, invocation, stdin), fields(command = %invocation), level = "debug")]
    async fn run_with(
        &self,
        invocation: &Invocation,
        stdin: Option<&str>,
        raise_on_error: bool,
    ) -> Result<ExecutionResult, ExecError> {
        ProcessRunner::new(invocation.clone())
            .run(stdin, raise_on_error)
            .await
    }

    fn executor_type(&self) -> &'static str {
        "local"
    }
}
