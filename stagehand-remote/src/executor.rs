//! The [`RemoteExecutor`] port and its command output type.

use std::path::Path;

use stagehand_core::RemotePath;

use crate::command::RemoteCommand;
use crate::error::RemoteError;

/// Result of a command that ran on the target, whatever its exit status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into [`RemoteError::CommandFailed`].
    pub fn ensure_success(self, command: &RemoteCommand) -> Result<CommandOutput, RemoteError> {
        if self.success() {
            return Ok(self);
        }
        Err(RemoteError::CommandFailed {
            command: command.to_shell(),
            exit_code: self.exit_code,
            stderr: self.stderr.trim().to_string(),
        })
    }
}

/// Remote command channel to one deployment target.
///
/// `Err` is reserved for failures of the channel (and of reading the local
/// upload source). A command that runs and exits non-zero comes back as
/// `Ok` with a non-zero [`CommandOutput::exit_code`]; callers decide whether
/// that matters.
///
/// Every call blocks until the remote side answers. There is no timeout at
/// this layer.
pub trait RemoteExecutor {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput, RemoteError>;

    fn run_privileged(&self, command: &RemoteCommand) -> Result<CommandOutput, RemoteError>;

    /// Copy `local` to `remote`, replacing whatever is there.
    fn upload(&self, local: &Path, remote: &RemotePath, privileged: bool)
        -> Result<(), RemoteError>;

    /// Human-readable target name for logs and errors.
    fn describe(&self) -> String;
}
