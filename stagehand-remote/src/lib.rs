//! # stagehand-remote
//!
//! The remote command channel: a typed [`RemoteCommand`] builder, the
//! [`RemoteExecutor`] port, and an OpenSSH implementation of it.
//!
//! With the `test-util` feature, [`MemoryExecutor`] provides an in-memory
//! target for tests.

pub mod command;
pub mod error;
pub mod executor;
pub mod shell;
pub mod ssh;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use command::RemoteCommand;
pub use error::RemoteError;
pub use executor::{CommandOutput, RemoteExecutor};
pub use ssh::SshExecutor;

#[cfg(any(test, feature = "test-util"))]
pub use memory::{ExecutedCommand, MemoryExecutor, RecordedUpload};
