use anyhow::{Context, Result};
use clap::Parser;
use motorecon::cli::{self, Cli};
use motorecon::error::CliError;
use motorecon::output::print_error;
use std::io;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        print_error(&format!("{:#}", e));
        return ExitCode::FAILURE;
    }

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Interrupted) => {
            println!("User interrupt.");
            ExitCode::FAILURE
        }
        Err(e) => {
            print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so they never mix with the report on stdout.
/// `RUST_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env()
        .context("failed to read RUST_LOG")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))
}
