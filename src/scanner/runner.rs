//! Child process execution.
//!
//! Both scan phases go through the [`CommandRunner`] trait so the
//! orchestration logic can be driven by a scripted runner in tests.

use crate::error::{RunError, RunResult};
use crate::template::CommandLine;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, trace};

/// What a finished child process produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Captured standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Exit code, or `None` if the child was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    /// Output of a child that exited with status 0.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a command line to completion and captures its stdout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`, killing it if `timeout` elapses first.
    async fn run(&self, command: &CommandLine, timeout: Option<Duration>) -> RunResult<ProcessOutput>;
}

/// Spawns real child processes with `tokio::process`.
///
/// stdin and stderr are detached; stdout is the only data channel. Children
/// are killed if their future is dropped, so cancelling a scan also stops
/// the scanners it started.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandLine, timeout: Option<Duration>) -> RunResult<ProcessOutput> {
        debug!(command = %command, "spawning");
        let started = Instant::now();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd.output();
        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, child)
                .await
                .map_err(|_| RunError::TimedOut(limit))?,
            None => child.await,
        }
        .map_err(|e| RunError::SpawnFailed {
            program: command.program.clone(),
            reason: e.to_string(),
        })?;

        let exit_code = output.status.code();
        debug!(
            program = %command.program,
            exit_code = ?exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "child exited"
        );
        trace!(bytes = output.stdout.len(), "captured stdout");

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code,
        })
    }
}
