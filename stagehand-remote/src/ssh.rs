//! OpenSSH-backed [`RemoteExecutor`].
//!
//! Shells out to the system `ssh` binary, so host keys, agents and
//! `~/.ssh/config` behave exactly as they do interactively. A target whose
//! host is `localhost` runs commands through `sh -c` instead.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use stagehand_core::{RemotePath, ServerConfig};

use crate::command::RemoteCommand;
use crate::error::{io_err, RemoteError};
use crate::executor::{CommandOutput, RemoteExecutor};
use crate::shell;

/// ssh reserves exit status 255 for its own failures.
const SSH_TRANSPORT_EXIT: i32 = 255;

pub struct SshExecutor {
    host: String,
    user: String,
    port: u16,
    identity_file: Option<PathBuf>,
    is_local: bool,
}

impl SshExecutor {
    pub fn from_server(server: &ServerConfig) -> Self {
        let identity_file = server
            .identity_file
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()));
        SshExecutor {
            host: server.host.clone(),
            user: server.user.clone(),
            port: server.port,
            identity_file,
            is_local: is_local_host(&server.host),
        }
    }

    fn ssh_args(&self, remote_command: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.to_string_lossy().into_owned());
        }
        if self.port != 22 {
            args.push("-p".to_string());
            args.push(self.port.to_string());
        }
        // Fail instead of prompting, and notice dead connections.
        for opt in [
            "BatchMode=yes",
            "ConnectTimeout=10",
            "ServerAliveInterval=15",
            "ServerAliveCountMax=3",
        ] {
            args.push("-o".to_string());
            args.push(opt.to_string());
        }
        args.push(format!("{}@{}", self.user, self.host));
        args.push(remote_command.to_string());
        args
    }

    fn execute(&self, line: &str, stdin: Option<&Path>) -> Result<CommandOutput, RemoteError> {
        let mut cmd = if self.is_local {
            let mut c = Command::new("sh");
            c.arg("-c").arg(line);
            c
        } else {
            let mut c = Command::new("ssh");
            c.args(self.ssh_args(line));
            c
        };

        match stdin {
            Some(path) => {
                let file = File::open(path).map_err(|e| io_err(path, e))?;
                cmd.stdin(file);
            }
            None => {
                cmd.stdin(Stdio::null());
            }
        }

        tracing::debug!(target_host = %self.describe(), command = %line, "executing");
        let output = cmd.output().map_err(|e| RemoteError::Transport {
            host: self.describe(),
            reason: format!("failed to spawn: {e}"),
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !self.is_local && exit_code == SSH_TRANSPORT_EXIT {
            return Err(RemoteError::Transport {
                host: self.describe(),
                reason: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
            exit_code,
        })
    }
}

impl RemoteExecutor for SshExecutor {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput, RemoteError> {
        self.execute(&command.to_shell(), None)
    }

    fn run_privileged(&self, command: &RemoteCommand) -> Result<CommandOutput, RemoteError> {
        self.execute(&sudo_line(command), None)
    }

    fn upload(
        &self,
        local: &Path,
        remote: &RemotePath,
        privileged: bool,
    ) -> Result<(), RemoteError> {
        let line = upload_line(remote, privileged);
        self.execute(&line, Some(local))?
            .ensure_success(&RemoteCommand::new("upload").path(remote))
            .map(|_| ())
    }

    fn describe(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// `sudo -n <command>`; `-n` makes a missing sudo password an error
/// rather than a hang.
fn sudo_line(command: &RemoteCommand) -> String {
    format!("sudo -n {}", command.to_shell())
}

/// Remote side of an upload; the file content arrives on stdin.
fn upload_line(remote: &RemotePath, privileged: bool) -> String {
    let target = shell::quote_arg(remote.as_str());
    if privileged {
        format!("sudo -n tee {target} > /dev/null")
    } else {
        format!("cat > {target}")
    }
}

fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}
