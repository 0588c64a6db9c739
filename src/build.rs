//! Ordered build pipeline for producing a deployable server package.
//!
//! The pipeline owns sequencing only: each step is one external toolchain
//! invocation, executed to completion through a [`CommandRunner`], and the
//! first failure aborts the whole run. Later steps depend on earlier ones'
//! output, so there is nothing to parallelize.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::UpdateError;
use crate::process::CommandRunner;

/// One external toolchain invocation.
#[derive(Debug, Clone)]
pub struct BuildStep {
    /// Attached to the failure when this step fails to launch or exits
    /// non-zero.
    pub failure_message: String,
    pub working_dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
}

impl BuildStep {
    pub fn new(failure_message: &str, working_dir: &Path, program: &str, args: &[&str]) -> Self {
        Self {
            failure_message: failure_message.to_string(),
            working_dir: working_dir.to_path_buf(),
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    /// Single-line rendering for logs and failure reports.
    pub fn display_command(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// A fixed, ordered sequence of build steps.
#[derive(Debug)]
pub struct BuildPipeline {
    steps: Vec<BuildStep>,
}

impl BuildPipeline {
    pub fn new(steps: Vec<BuildStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// The cancellation token is checked before each step and honored by the
    /// runner while a step executes. A non-zero exit carries the step's
    /// failure message and captured output; no later step runs.
    pub fn run(&self, runner: &dyn CommandRunner, cancel: &CancelToken) -> Result<(), UpdateError> {
        for step in &self.steps {
            if cancel.is_cancelled() {
                return Err(UpdateError::Cancelled);
            }

            debug!(command = %step.display_command(), "running pipeline step");
            let output = runner.run(step, cancel)?;
            if !output.success() {
                return Err(UpdateError::BuildCommand {
                    step: step.display_command(),
                    message: step.failure_message.clone(),
                    output: output.output,
                });
            }
        }
        Ok(())
    }
}
