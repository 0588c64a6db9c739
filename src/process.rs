//! External command execution with cooperative cancellation.
//!
//! [`CommandRunner`] is the seam between the build pipeline and the host:
//! the real [`ProcessRunner`] spawns the toolchain, while tests inject
//! recording doubles that never touch the host.

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Duration;

use tracing::debug;

use crate::build::BuildStep;
use crate::cancel::CancelToken;
use crate::error::UpdateError;

/// How often the runner re-checks the child and the cancellation token.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of one completed external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Merged stdout and stderr transcript, in arrival order.
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs one external command to completion.
///
/// `Ok` means the process ran and exited (with any code); `Err` is a launch
/// failure or cancellation. On cancellation the child must be terminated,
/// never abandoned.
pub trait CommandRunner: Send + Sync {
    fn run(&self, step: &BuildStep, cancel: &CancelToken) -> Result<CommandOutput, UpdateError>;
}

/// [`CommandRunner`] backed by real host processes.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, step: &BuildStep, cancel: &CancelToken) -> Result<CommandOutput, UpdateError> {
        debug!(
            command = %step.display_command(),
            cwd = %step.working_dir.display(),
            "spawning build command"
        );

        let mut child = Command::new(&step.program)
            .args(&step.args)
            .current_dir(&step.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| UpdateError::BuildCommand {
                step: step.display_command(),
                message: step.failure_message.clone(),
                output: format!("failed to launch '{}': {}", step.program, e),
            })?;

        // Reader threads forward output so the child never blocks on a full
        // pipe while we poll for exit or cancellation.
        let (tx, rx) = mpsc::channel::<String>();
        if let Some(stdout) = child.stdout.take() {
            spawn_line_reader(stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_reader(stderr, tx.clone());
        }
        drop(tx);

        let status = loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(UpdateError::Cancelled);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(UpdateError::BuildCommand {
                        step: step.display_command(),
                        message: step.failure_message.clone(),
                        output: format!("failed to poll '{}': {}", step.program, e),
                    });
                }
            }
        };

        // Senders are dropped once the pipes hit EOF, so this drains fully.
        let lines: Vec<String> = rx.iter().collect();
        Ok(CommandOutput {
            exit_code: status.code(),
            output: lines.join("\n"),
        })
    }
}

fn spawn_line_reader<R: Read + Send + 'static>(reader: R, tx: mpsc::Sender<String>) {
    std::thread::spawn(move || {
        let reader = BufReader::new(reader);
        for line in reader.lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}
