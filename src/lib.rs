//! # motorecon - masscan speed, Nmap detail
//!
//! motorecon sweeps IPv4 hosts in two phases. A fast port scanner (masscan
//! by default) finds open TCP ports; a service scanner (Nmap by default)
//! then runs against exactly those ports. Both commands come from a TOML
//! config file, so any scanner that prints masscan-style lines can be
//! plugged in.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use motorecon::config::ScanConfig;
//! use motorecon::output::ScanUi;
//! use motorecon::scanner::{HostScanner, SystemRunner};
//! use std::num::NonZeroU32;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScanConfig::load("conf.toml".as_ref())?;
//!     let scanner = HostScanner::new(&SystemRunner, &config, "tun0", NonZeroU32::new(1000).unwrap());
//!
//!     let result = scanner.scan("10.10.10.5".parse()?, &ScanUi::silent()).await;
//!     print!("{}", result.report.render(motorecon::output::Rendering::Plain));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port lists and target specifications
//! - [`template`] - Command templates and their placeholders
//! - [`config`] - Locating and loading the scanner config
//! - [`scanner`] - Child processes, the two phases and the host sweep
//! - [`output`] - Styled reports, terminal feed and saved files
//! - [`cli`] - Argument parsing and the scan command
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod template;
pub mod types;

// Re-export commonly used types
pub use config::ScanConfig;
pub use error::{CliError, ConfigError, RunError};
pub use scanner::{HostResult, HostScanner};
pub use types::{Port, PortList, TargetSpec};
