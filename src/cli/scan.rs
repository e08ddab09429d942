//! Scan command implementation.
//!
//! Validates the command line, loads the config, sweeps the targets and
//! prints (and optionally saves) the combined report.

use super::Cli;
use crate::config::ScanConfig;
use crate::error::{CliError, CliResult};
use crate::output::{
    self, format_elapsed, print_report, save_report, terminal_rendering, Line, Report, Role,
    ScanUi,
};
use crate::scanner::{
    host_count, run_sweep, CommandRunner, HostScanner, SystemRunner, DEFAULT_CONCURRENCY,
};
use crate::types::TargetSpec;
use clap::CommandFactory;
use std::future::Future;
use std::io;
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Facts about the machine the scan runs on.
#[derive(Debug, Clone)]
pub struct SystemEnv {
    /// Names of the available network interfaces.
    pub interfaces: Vec<String>,
    /// Whether the effective user is root.
    pub is_root: bool,
}

impl SystemEnv {
    pub fn detect() -> Self {
        Self {
            interfaces: pnet::datalink::interfaces()
                .into_iter()
                .map(|iface| iface.name)
                .collect(),
            is_root: is_root(),
        }
    }
}

/// A validated scan request.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub targets: Vec<TargetSpec>,
    pub iface: String,
    pub rate: NonZeroU32,
    pub output: Option<PathBuf>,
    pub config: PathBuf,
    pub concurrency: Option<NonZeroUsize>,
    pub quiet: bool,
}

impl ScanPlan {
    /// Check the command line in order: targets, interface, rate, privileges.
    pub fn from_cli(cli: &Cli, env: &SystemEnv) -> CliResult<Self> {
        if cli.targets.is_empty() {
            return Err(CliError::NoTargets);
        }

        let targets = cli
            .targets
            .iter()
            .map(|t| TargetSpec::parse(t))
            .collect::<Result<Vec<_>, _>>()?;

        if !env.interfaces.iter().any(|name| *name == cli.interface) {
            return Err(CliError::UnknownInterface(cli.interface.clone()));
        }

        let rate = parse_rate(&cli.rate)?;

        if !env.is_root {
            return Err(CliError::NotRoot);
        }

        Ok(Self {
            targets,
            iface: cli.interface.clone(),
            rate,
            output: cli.output.clone(),
            config: cli.config.clone(),
            concurrency: cli.concurrency,
            quiet: cli.quiet,
        })
    }
}

/// Parse a packets-per-second rate; it must be a positive integer.
pub fn parse_rate(raw: &str) -> CliResult<NonZeroU32> {
    raw.trim()
        .parse::<NonZeroU32>()
        .map_err(|_| CliError::InvalidRate(raw.to_string()))
}

/// Run a scan on this machine with real scanner processes.
pub async fn run(cli: Cli) -> CliResult<()> {
    run_with(&cli, &SystemEnv::detect(), &SystemRunner).await
}

/// Run a scan with an explicit environment and process runner.
pub async fn run_with(cli: &Cli, env: &SystemEnv, runner: &dyn CommandRunner) -> CliResult<()> {
    if cli.targets.is_empty() {
        Cli::command().print_help()?;
        println!();
    }

    let plan = ScanPlan::from_cli(cli, env)?;
    let config = ScanConfig::load(&plan.config)?;
    if config.source != plan.config {
        output::print_info(&format!("Using config file {}", config.source.display()));
    }
    debug!(config = %config.source.display(), "config loaded");

    let report = execute(&plan, &config, runner).await?;

    if let Some(path) = &plan.output {
        match save_report(&report, path) {
            Ok(saved) => {
                output::print_success(&format!("Output has been saved to: {}", saved.plain.display()));
                output::print_success(&format!(
                    "Colored output has been saved to: {}",
                    saved.colored.display()
                ));
            }
            Err(e) => output::print_warning(&e.to_string()),
        }
    }

    Ok(())
}

/// Sweep every target and print the combined report.
///
/// Ctrl-C stops the sweep; dropping it kills every running scanner.
pub async fn execute(
    plan: &ScanPlan,
    config: &ScanConfig,
    runner: &dyn CommandRunner,
) -> CliResult<Report> {
    let started = Instant::now();
    let hosts = host_count(&plan.targets);
    let concurrency = plan
        .concurrency
        .or(config.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);

    println!(
        "{}",
        Line::new()
            .styled(Role::Highlight, plan.targets.len().to_string())
            .styled(Role::Info, " targets to scan..")
            .render(terminal_rendering())
    );
    info!(hosts, concurrency = concurrency.get(), iface = %plan.iface, rate = plan.rate.get(), "starting sweep");

    let ui = ScanUi::new(hosts, plan.quiet);
    let scanner = HostScanner::new(runner, config, plan.iface.clone(), plan.rate);

    let results = tokio::select! {
        results = run_sweep(&plan.targets, &scanner, concurrency, &ui) => results,
        _ = interrupted(tokio::signal::ctrl_c()) => {
            ui.finish();
            return Err(CliError::Interrupted);
        }
    };
    ui.finish();

    let report: Report = results.into_iter().map(|result| result.report).collect();
    print_report(&report);
    println!(
        "{}",
        Line::new()
            .styled(Role::Muted, "Total time taken: ")
            .styled(Role::Accent, format_elapsed(started.elapsed()))
            .render(terminal_rendering())
    );

    Ok(report)
}

/// Resolves once `signal` reports a Ctrl-C.
///
/// If the handler could not be installed this never resolves, so the sweep
/// runs to completion instead of being cancelled.
async fn interrupted<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "couldn't listen for Ctrl-C, scan can't be interrupted");
        std::future::pending::<()>().await;
    }
}

/// Check if running with root privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
