//! Configuration management for motorecon.
//!
//! Loads the scanner command templates from a TOML file, searching the
//! working directory, the executable's directory and the XDG config
//! directory.

mod settings;

pub use settings::{candidate_paths, PhaseConfig, ScanConfig, DEFAULT_CONFIG_FILE};
