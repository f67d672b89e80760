//! Content fingerprints and the update decision.
//!
//! Both sides use SHA-256 rendered as lowercase hex: the local side hashes
//! the staged bytes, the remote side runs `sha256sum`. Only the digest ever
//! crosses the channel.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use stagehand_core::RemotePath;
use stagehand_remote::{RemoteCommand, RemoteError, RemoteExecutor};

/// A SHA-256 digest in lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Fingerprint(hex::encode(Sha256::digest(bytes)))
    }

    /// Parse the first field of `sha256sum` output. Uppercase digests are
    /// normalised; anything that is not 64 hex digits is rejected.
    pub fn parse(output: &str) -> Option<Self> {
        let digest = output.split_whitespace().next()?;
        // Some sha256sum builds prefix the digest with `\` for escaped names.
        let digest = digest.strip_prefix('\\').unwrap_or(digest);
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Fingerprint(digest.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for tables.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Fingerprint of a staged file on the local disk.
pub fn local_fingerprint(path: &Path) -> std::io::Result<Fingerprint> {
    std::fs::read(path).map(|bytes| Fingerprint::of_bytes(&bytes))
}

/// Fingerprint of the file installed at `path`, or `None` if it is missing
/// (or unreadable, which the deploy flow treats the same way).
///
/// Transport failures and unparseable output are errors.
pub fn remote_fingerprint(
    executor: &dyn RemoteExecutor,
    path: &RemotePath,
) -> Result<Option<Fingerprint>, RemoteError> {
    let command = RemoteCommand::sha256sum(path);
    let output = executor.run(&command)?;
    if !output.success() {
        return Ok(None);
    }
    Fingerprint::parse(&output.stdout)
        .map(Some)
        .ok_or_else(|| RemoteError::UnexpectedOutput {
            command: command.to_shell(),
            output: output.stdout.trim().to_string(),
        })
}

/// An update is needed unless the remote file exists with the same digest.
pub fn needs_update(local: &Fingerprint, remote: Option<&Fingerprint>) -> bool {
    remote != Some(local)
}
