//! Error types for stagehand-renderer.

use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while rendering a service template.
///
/// Every variant is fatal for the service being rendered.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template syntax error, a placeholder missing from the context, or a
    /// failing filter. `message` is the flattened tera error with secret
    /// values already scrubbed; the tera error itself is not kept because
    /// its text can quote them.
    #[error("failed to render template {template}: {message}")]
    Template { template: String, message: String },

    /// Filesystem error reading the template or writing the staged file.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

/// Tera keeps the useful part ("Variable `X` not found ...") in the source
/// chain; flatten it so a single-line report carries it.
pub(crate) fn describe(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut cause = err.source();
    while let Some(inner) = cause {
        parts.push(inner.to_string());
        cause = inner.source();
    }
    parts.join(": ")
}
