//! Error types for stagehand-remote.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while talking to a deployment target.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The channel itself failed: ssh could not be spawned, the connection
    /// dropped, or authentication was refused.
    #[error("transport to {host} failed: {reason}")]
    Transport { host: String, reason: String },

    /// The remote command ran and exited non-zero.
    #[error("`{command}` exited with status {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// The command succeeded but printed something the caller cannot parse.
    #[error("`{command}` returned unexpected output: {output:?}")]
    UnexpectedOutput { command: String, output: String },

    /// Local file that was supposed to be uploaded could not be opened.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    /// True when the target could not be reached at all, as opposed to a
    /// command that ran and failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport { .. })
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        path: path.into(),
        source,
    }
}
