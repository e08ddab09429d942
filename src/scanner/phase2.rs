//! Phase 2: service detection on the ports phase 1 found.
//!
//! The detector's output is not parsed; it goes into the host report as is.

use super::runner::CommandRunner;
use crate::config::PhaseConfig;
use crate::error::RunError;
use crate::template::Phase2Fields;
use std::time::Duration;

/// How the service detection of one host ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase2Outcome {
    /// The detector ran to completion; `output` is its raw stdout.
    Completed {
        output: String,
        exit_code: Option<i32>,
    },
    /// The detector could not be started.
    SpawnFailed(String),
    /// The configured time limit elapsed.
    TimedOut(Duration),
}

impl Phase2Outcome {
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Completed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Run service detection for one host.
pub async fn run(
    runner: &dyn CommandRunner,
    phase: &PhaseConfig<Phase2Fields>,
    fields: &Phase2Fields,
) -> Phase2Outcome {
    let result = match phase.template.command_line(fields) {
        Ok(command) => runner.run(&command, phase.timeout).await,
        Err(e) => Err(RunError::from(e)),
    };

    match result {
        Ok(output) => Phase2Outcome::Completed {
            output: output.stdout,
            exit_code: output.exit_code,
        },
        Err(RunError::TimedOut(limit)) => Phase2Outcome::TimedOut(limit),
        Err(e) => Phase2Outcome::SpawnFailed(e.to_string()),
    }
}
