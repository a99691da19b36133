//! pipshell-exec: Child process execution
//!
//! Spawns an external program from an argument vector, enforces a timeout,
//! captures its output and classifies the outcome.

pub mod error;
pub mod invocation;
pub mod local;
pub mod result;
pub mod runner;
pub mod traits;

pub use error::{ExecError, FailureKind};
pub use invocation::{DEFAULT_TIMEOUT, Invocation};
pub use local::LocalExecutor;
pub use result::{ExecutionResult, MISSING_RETURN_CODE};
pub use runner::ProcessRunner;
pub use traits::CommandExecutor;
