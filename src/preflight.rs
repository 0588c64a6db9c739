//! Host toolchain validation before any build work runs.
//!
//! Failing fast on a missing toolchain beats a cryptic mid-pipeline error.

use crate::error::UpdateError;

/// Tools the local build provider invokes.
pub const BUILD_TOOLS: &[&str] = &["cargo"];

/// Check whether a command is present on PATH.
pub fn command_exists(tool: &str) -> bool {
    which::which(tool).is_ok()
}

/// Verify every listed build tool is installed.
pub fn check_build_tools(tools: &[&str]) -> Result<(), UpdateError> {
    for tool in tools {
        if !command_exists(tool) {
            return Err(UpdateError::MissingTool {
                tool: tool.to_string(),
            });
        }
    }
    Ok(())
}
