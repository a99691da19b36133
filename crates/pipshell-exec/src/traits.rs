//! Command executor trait

use async_trait::async_trait;

use crate::error::ExecError;
use crate::invocation::Invocation;
use crate::result::ExecutionResult;

/// Something that can run an [`Invocation`] to completion
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run with optional stdin, choosing whether a non-zero exit is an error
    async fn run_with(
        &self,
        invocation: &Invocation,
        stdin: Option<&str>,
        raise_on_error: bool,
    ) -> Result<ExecutionResult, ExecError>;

    /// Run without stdin, treating a non-zero exit as an error
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, ExecError> {
        self.run_with(invocation, None, true).await
    }

    fn executor_type(&self) -> &'static str;
}
