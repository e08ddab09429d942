//! Scanner module - coordinates the two scan phases across hosts.
//!
//! Every target is expanded into hosts, which feed a bounded pool of
//! concurrent host scans. Results come back in completion order.

pub mod host;
pub mod phase1;
pub mod phase2;
pub mod runner;

use crate::output::ScanUi;
use crate::types::TargetSpec;
use futures::stream::{self, StreamExt};
use std::num::NonZeroUsize;
use std::time::Instant;
use tracing::info;

pub use host::{HostResult, HostScanner};
pub use phase1::Phase1Outcome;
pub use phase2::Phase2Outcome;
pub use runner::{CommandRunner, ProcessOutput, SystemRunner};

/// Hosts scanned at once when neither the CLI nor the config says otherwise.
pub const DEFAULT_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(n) => n,
    None => unreachable!(),
};

/// Total number of hosts the targets expand to.
pub fn host_count(targets: &[TargetSpec]) -> u64 {
    targets.iter().map(TargetSpec::host_count).sum()
}

/// Scan every host of every target, at most `concurrency` at a time.
pub async fn run_sweep(
    targets: &[TargetSpec],
    scanner: &HostScanner<'_>,
    concurrency: NonZeroUsize,
    ui: &ScanUi,
) -> Vec<HostResult> {
    let started = Instant::now();
    let hosts = targets.iter().flat_map(TargetSpec::hosts);

    let results: Vec<HostResult> = stream::iter(hosts)
        .map(|host| async move {
            let result = scanner.scan(host, ui).await;
            ui.host_done();
            result
        })
        .buffer_unordered(concurrency.get())
        .collect()
        .await;

    info!(
        hosts = results.len(),
        concurrency = concurrency.get(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "sweep finished"
    );

    results
}
