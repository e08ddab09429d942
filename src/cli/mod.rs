//! Command-line interface definitions for motorecon.
//!
//! Uses `clap` derive macros for declarative argument parsing. Values that
//! must fail with the tool's own exit status (targets, interface, rate) are
//! taken as strings and checked in [`scan`].

pub mod scan;

pub use scan::{run, ScanPlan, SystemEnv};

use crate::config::DEFAULT_CONFIG_FILE;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Scan targets with the speed of masscan. Enumerate ports with the
/// functionality of Nmap.
#[derive(Parser, Debug, Clone)]
#[command(name = "motorecon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan targets with the speed of masscan. Enumerate ports with the functionality of Nmap.", long_about = None)]
pub struct Cli {
    /// IP address(es) or CIDR block(s) to scan
    ///
    /// Examples:
    ///   10.10.10.5            Single host
    ///   10.10.10.5 10.10.10.7 Several hosts
    ///   192.168.1.0/24        Every address in the block
    #[arg(value_name = "TARGETS")]
    pub targets: Vec<String>,

    /// Interface to use while scanning (used by the port scanner)
    #[arg(short = 'i', long = "interface", default_value = "tun0")]
    pub interface: String,

    /// Transmit rate: packets per second the port scanner may send
    #[arg(short = 'r', long = "rate", default_value = "1000", allow_hyphen_values = true)]
    pub rate: String,

    /// Save the report here (a colored copy goes to <PATH>.colored)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to the scanner command configuration
    #[arg(short = 'c', long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Maximum number of hosts scanned at the same time
    #[arg(short = 'j', long = "concurrency", value_name = "N")]
    pub concurrency: Option<NonZeroUsize>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide the live scan feed and progress bar
    #[arg(short, long)]
    pub quiet: bool,
}
