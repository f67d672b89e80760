//! Typed remote command builder.
//!
//! Commands are a program plus an explicit argument list. Nothing is ever
//! spliced into a shell string by hand: quoting happens once, in
//! [`RemoteCommand::to_shell`], when the command is put on the wire.

use std::fmt;

use stagehand_core::RemotePath;

use crate::shell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    program: String,
    args: Vec<String>,
}

impl RemoteCommand {
    pub fn new(program: impl Into<String>) -> Self {
        RemoteCommand {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a remote path as a single argument.
    pub fn path(self, path: &RemotePath) -> Self {
        self.arg(path.as_str())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// The command as one shell-safe string.
    pub fn to_shell(&self) -> String {
        shell::join(std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str)))
    }

    // -----------------------------------------------------------------------
    // Common commands
    // -----------------------------------------------------------------------

    /// `service <name> <verb>`
    pub fn service(name: &str, verb: &str) -> Self {
        RemoteCommand::new("service").arg(name).arg(verb)
    }

    /// `rm -f <path>`; succeeds when the file is already gone.
    pub fn remove_file(path: &RemotePath) -> Self {
        RemoteCommand::new("rm").arg("-f").path(path)
    }

    /// `sha256sum <path>`
    pub fn sha256sum(path: &RemotePath) -> Self {
        RemoteCommand::new("sha256sum").path(path)
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell())
    }
}
