//! In-memory [`RemoteExecutor`] for tests.
//!
//! Keeps a table of remote files, records every command and upload, and
//! understands just enough of `sha256sum`, `rm` and `touch` for the deploy
//! flow to behave as it would against a real host.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use sha2::{Digest, Sha256};
use stagehand_core::RemotePath;

use crate::command::RemoteCommand;
use crate::error::{io_err, RemoteError};
use crate::executor::{CommandOutput, RemoteExecutor};

const HOST: &str = "memory";

/// One command as the executor saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommand {
    pub command: String,
    pub privileged: bool,
}

/// One upload as the executor saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub path: String,
    pub privileged: bool,
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, Vec<u8>>,
    executed: Vec<ExecutedCommand>,
    uploads: Vec<RecordedUpload>,
    failing_uploads: BTreeSet<String>,
    failing_commands: BTreeSet<String>,
    unreachable: bool,
}

#[derive(Debug, Default)]
pub struct MemoryExecutor {
    state: RefCell<State>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.put_file(path, content);
        self
    }

    pub fn put_file(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_string(), content.into());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.borrow().files.get(path).cloned()
    }

    /// Uploads to `path` fail with a transport error.
    pub fn fail_upload_to(&self, path: &str) {
        self.state
            .borrow_mut()
            .failing_uploads
            .insert(path.to_string());
    }

    /// The command whose shell form equals `command` exits 1.
    pub fn fail_command(&self, command: &str) {
        self.state
            .borrow_mut()
            .failing_commands
            .insert(command.to_string());
    }

    /// Every call fails with a transport error while set.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.borrow_mut().unreachable = unreachable;
    }

    pub fn executed(&self) -> Vec<ExecutedCommand> {
        self.state.borrow().executed.clone()
    }

    /// Shell forms of every executed command, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.state
            .borrow()
            .executed
            .iter()
            .map(|c| c.command.clone())
            .collect()
    }

    /// How many times the command with shell form `command` ran.
    pub fn count(&self, command: &str) -> usize {
        self.state
            .borrow()
            .executed
            .iter()
            .filter(|c| c.command == command)
            .count()
    }

    /// Remote paths uploaded to, in order.
    pub fn uploads(&self) -> Vec<String> {
        self.state
            .borrow()
            .uploads
            .iter()
            .map(|u| u.path.clone())
            .collect()
    }

    pub fn upload_records(&self) -> Vec<RecordedUpload> {
        self.state.borrow().uploads.clone()
    }

    fn transport_error(&self) -> RemoteError {
        RemoteError::Transport {
            host: HOST.to_string(),
            reason: "simulated connection failure".to_string(),
        }
    }

    fn execute(
        &self,
        command: &RemoteCommand,
        privileged: bool,
    ) -> Result<CommandOutput, RemoteError> {
        let mut state = self.state.borrow_mut();
        if state.unreachable {
            return Err(self.transport_error());
        }
        let line = command.to_shell();
        state.executed.push(ExecutedCommand {
            command: line.clone(),
            privileged,
        });
        if state.failing_commands.contains(&line) {
            return Ok(failure("simulated failure"));
        }

        let args = command.arguments();
        let output = match command.program() {
            "sha256sum" => match args.last().and_then(|p| state.files.get(p)) {
                Some(content) => {
                    let digest = hex::encode(Sha256::digest(content));
                    CommandOutput {
                        stdout: format!("{digest}  {}\n", args[args.len() - 1]),
                        ..Default::default()
                    }
                }
                None => failure("sha256sum: No such file or directory"),
            },
            "rm" => {
                let force = args.iter().any(|a| a == "-f");
                let mut missing = false;
                for path in args.iter().filter(|a| !a.starts_with('-')) {
                    missing |= state.files.remove(path).is_none();
                }
                if missing && !force {
                    failure("rm: cannot remove: No such file or directory")
                } else {
                    CommandOutput::default()
                }
            }
            "touch" => {
                for path in args.iter().filter(|a| !a.starts_with('-')) {
                    state.files.entry(path.clone()).or_default();
                }
                CommandOutput::default()
            }
            _ => CommandOutput::default(),
        };
        Ok(output)
    }
}

fn failure(stderr: &str) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: 1,
    }
}

impl RemoteExecutor for MemoryExecutor {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput, RemoteError> {
        self.execute(command, false)
    }

    fn run_privileged(&self, command: &RemoteCommand) -> Result<CommandOutput, RemoteError> {
        self.execute(command, true)
    }

    fn upload(
        &self,
        local: &Path,
        remote: &RemotePath,
        privileged: bool,
    ) -> Result<(), RemoteError> {
        {
            let state = self.state.borrow();
            if state.unreachable || state.failing_uploads.contains(remote.as_str()) {
                return Err(self.transport_error());
            }
        }
        let content = std::fs::read(local).map_err(|e| io_err(local, e))?;
        let mut state = self.state.borrow_mut();
        state.files.insert(remote.as_str().to_string(), content);
        state.uploads.push(RecordedUpload {
            path: remote.as_str().to_string(),
            privileged,
        });
        Ok(())
    }

    fn describe(&self) -> String {
        HOST.to_string()
    }
}
