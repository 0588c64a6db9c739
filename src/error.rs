//! Failure taxonomy for the update pipeline.
//!
//! Every failure the pipeline can produce is a distinct kind, so callers can
//! implement retry or backoff policies without parsing log text.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    /// A build step failed to launch or exited non-zero.
    #[error("{message}: `{step}` failed")]
    BuildCommand {
        /// Rendered command line of the failing step.
        step: String,
        /// The step's own failure message.
        message: String,
        /// Captured process output (or the launch error).
        output: String,
    },

    /// Clearing the binary directory, reading the package, or unpacking an
    /// entry failed.
    #[error("failed to deploy server package: {reason}")]
    Extraction { reason: String },

    /// An archive entry would resolve outside the deploy directory.
    #[error("archive entry escapes the deploy directory: '{entry}'")]
    PathTraversal { entry: String },

    /// Setting execute permissions on the deployed server executable failed.
    #[error("failed to set permissions on '{}': {reason}", .path.display())]
    Permission { path: PathBuf, reason: String },

    /// The cancellation token was observed mid-update.
    #[error("update cancelled")]
    Cancelled,

    /// A required build tool is not installed on the host.
    #[error("required build tool '{tool}' not found in PATH")]
    MissingTool { tool: String },
}
