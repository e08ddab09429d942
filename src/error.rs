//! Error types for motorecon.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::types::TargetError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while locating, reading or validating the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't find the config file (tried: {})", display_paths(.tried))]
    NotFound { tried: Vec<PathBuf> },

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid config format in {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("{phase} template uses unknown placeholder {{{name}}}")]
    UnknownPlaceholder { phase: &'static str, name: String },

    #[error("{phase} template must contain the {{target}} placeholder")]
    MissingTarget { phase: &'static str },

    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),
}

/// Errors raised when turning a rendered template into a command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("rendered command is empty")]
    EmptyCommand,
}

/// Fatal errors raised by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("no targets were supplied")]
    NoTargets,

    #[error("{0} (IPv4 format is needed for all targets)")]
    Target(#[from] TargetError),

    #[error("invalid interface: couldn't find interface {0}")]
    UnknownInterface(String),

    #[error("invalid rate '{0}': it should be a number that's larger than 0")]
    InvalidRate(String),

    #[error("root permissions are required for the scan")]
    NotRoot,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("user interrupt")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while running a scanner child process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("failed to start {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Errors raised while persisting the final report.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("couldn't save output to file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Result type alias for child process runs.
pub type RunResult<T> = Result<T, RunError>;

/// Result type alias for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_every_path() {
        let err = ConfigError::NotFound {
            tried: vec![PathBuf::from("conf.toml"), PathBuf::from("/opt/motorecon/conf.toml")],
        };
        assert_eq!(
            err.to_string(),
            "couldn't find the config file (tried: conf.toml, /opt/motorecon/conf.toml)"
        );
    }

    #[test]
    fn test_placeholder_message_keeps_braces() {
        let err = ConfigError::UnknownPlaceholder {
            phase: "phase1",
            name: "ports".to_string(),
        };
        assert_eq!(err.to_string(), "phase1 template uses unknown placeholder {ports}");
    }
}
