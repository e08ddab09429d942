//! Phase 1: fast port discovery.
//!
//! Runs the configured port scanner against one host and pulls open ports
//! out of its line output. The expected line layout is masscan's:
//!
//! ```text
//! Discovered open port 443/tcp on 10.10.10.5
//! ```
//!
//! i.e. the fourth whitespace-separated field is `PORT/PROTO`.

use super::runner::CommandRunner;
use crate::config::PhaseConfig;
use crate::error::RunError;
use crate::template::Phase1Fields;
use crate::types::{Port, PortList};
use std::fmt;
use std::time::Duration;
use tracing::{trace, warn};

/// How the port scan of one host ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase1Outcome {
    /// At least one open port was reported.
    PortsFound(PortList),
    /// The scanner exited cleanly without reporting any port.
    NoPortsFound,
    /// The scanner exited non-zero (or was killed) and reported nothing.
    ChildProcessFailed { exit_code: Option<i32> },
    /// The scanner could not be started.
    SpawnFailed(String),
    /// The configured time limit elapsed.
    TimedOut(Duration),
}

impl Phase1Outcome {
    /// Ports to hand to service detection, if any.
    pub fn ports(&self) -> Option<&PortList> {
        match self {
            Self::PortsFound(ports) => Some(ports),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ChildProcessFailed { .. } | Self::SpawnFailed(_) | Self::TimedOut(_)
        )
    }
}

impl fmt::Display for Phase1Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortsFound(ports) => write!(f, "open ports {}", ports),
            Self::NoPortsFound => write!(f, "no open ports"),
            Self::ChildProcessFailed { exit_code: Some(code) } => {
                write!(f, "port scanner exited with status {}", code)
            }
            Self::ChildProcessFailed { exit_code: None } => {
                write!(f, "port scanner was terminated by a signal")
            }
            Self::SpawnFailed(reason) => write!(f, "{}", reason),
            Self::TimedOut(limit) => write!(f, "port scanner timed out after {}s", limit.as_secs()),
        }
    }
}

/// Extract the port from one scanner output line.
///
/// Returns `None` for lines without a fourth field or whose fourth field
/// does not start with a valid port number.
pub fn parse_line(line: &str) -> Option<Port> {
    let field = line.split_whitespace().nth(3)?;
    let port = field.split('/').next()?;
    port.parse().ok()
}

/// Collect every port reported in the scanner output.
pub fn parse_ports(stdout: &str) -> PortList {
    stdout
        .lines()
        .filter_map(|line| {
            let port = parse_line(line);
            if port.is_none() && !line.trim().is_empty() {
                trace!(line, "skipping unparsable line");
            }
            port
        })
        .collect()
}

/// Run the port scanner for one host.
pub async fn run(
    runner: &dyn CommandRunner,
    phase: &PhaseConfig<Phase1Fields>,
    fields: &Phase1Fields,
) -> Phase1Outcome {
    let output = match phase.template.command_line(fields) {
        Ok(command) => runner.run(&command, phase.timeout).await,
        Err(e) => Err(RunError::from(e)),
    };

    let output = match output {
        Ok(output) => output,
        Err(RunError::TimedOut(limit)) => return Phase1Outcome::TimedOut(limit),
        Err(e) => return Phase1Outcome::SpawnFailed(e.to_string()),
    };

    let ports = parse_ports(&output.stdout);

    match (ports.is_empty(), output.success()) {
        (false, success) => {
            if !success {
                warn!(
                    host = %fields.target,
                    exit_code = ?output.exit_code,
                    "port scanner exited non-zero but reported ports"
                );
            }
            Phase1Outcome::PortsFound(ports)
        }
        (true, true) => Phase1Outcome::NoPortsFound,
        (true, false) => Phase1Outcome::ChildProcessFailed {
            exit_code: output.exit_code,
        },
    }
}
