//! Scanning a single host.
//!
//! A host goes through phase 1 and, only if phase 1 found open ports,
//! phase 2. Either way the scan ends with a finished [`HostResult`]; a
//! failing scanner is recorded in the result, never retried.

use super::phase1::{self, Phase1Outcome};
use super::phase2::{self, Phase2Outcome};
use super::runner::CommandRunner;
use crate::config::ScanConfig;
use crate::output::{format_elapsed, Line, Report, Role, ScanUi};
use crate::template::{Phase1Fields, Phase2Fields};
use crate::types::PortList;
use std::net::Ipv4Addr;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Everything learned about one host.
#[derive(Debug, Clone)]
pub struct HostResult {
    pub host: Ipv4Addr,
    pub phase1: Phase1Outcome,
    /// `None` when phase 1 found nothing to detect.
    pub phase2: Option<Phase2Outcome>,
    /// This host's block of the final report.
    pub report: Report,
    pub elapsed: Duration,
}

impl HostResult {
    /// Open ports found by phase 1.
    pub fn ports(&self) -> Option<&PortList> {
        self.phase1.ports()
    }
}

/// Runs both scan phases against individual hosts.
pub struct HostScanner<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a ScanConfig,
    iface: String,
    rate: NonZeroU32,
}

impl<'a> HostScanner<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        config: &'a ScanConfig,
        iface: impl Into<String>,
        rate: NonZeroU32,
    ) -> Self {
        Self {
            runner,
            config,
            iface: iface.into(),
            rate,
        }
    }

    /// Scan one host from start to finish.
    pub async fn scan(&self, host: Ipv4Addr, ui: &ScanUi) -> HostResult {
        let started = Instant::now();
        let addr = host.to_string();
        let mut report = Report::new();

        ui.line(&Line::new().styled(Role::Info, "Masscanning target: ").styled(Role::Accent, &addr));

        let phase1 = phase1::run(
            self.runner,
            &self.config.phase1,
            &Phase1Fields {
                target: host,
                iface: self.iface.clone(),
                rate: self.rate,
            },
        )
        .await;
        debug!(host = %addr, outcome = %phase1, "phase 1 finished");

        let phase2 = match &phase1 {
            Phase1Outcome::PortsFound(ports) => {
                for port in ports.iter() {
                    ui.line(
                        &Line::new()
                            .styled(Role::Info, "Discovered open port ")
                            .styled(Role::Accent, port.to_string())
                            .styled(Role::Info, "/tcp on ")
                            .styled(Role::Accent, &addr),
                    );
                }
                ui.line(&Line::new().styled(Role::Accent, &addr).styled(Role::Info, " Masscanned successfully."));
                ui.line(&Line::new().styled(Role::Info, "Nmapping target: ").styled(Role::Accent, &addr));

                let outcome = phase2::run(
                    self.runner,
                    &self.config.phase2,
                    &Phase2Fields {
                        target: host,
                        masscan_ports: ports.clone(),
                    },
                )
                .await;

                record_phase2(&mut report, &addr, &outcome, ui);
                ui.line(&Line::new().styled(Role::Info, "Scan has finished for ").styled(Role::Accent, &addr));
                report.highlight(&addr, ports);
                report.push(
                    Line::new()
                        .styled(Role::Info, "Time taken: ")
                        .styled(Role::Accent, format_elapsed(started.elapsed())),
                );
                Some(outcome)
            }
            Phase1Outcome::NoPortsFound => {
                let line = Line::new()
                    .styled(Role::Warning, "No open TCP ports for ")
                    .styled(Role::Highlight, &addr);
                ui.line(&line);
                report.push(line);
                None
            }
            failed => {
                let line = Line::new()
                    .styled(Role::Warning, "Masscan failed for ")
                    .styled(Role::Highlight, &addr)
                    .styled(Role::Warning, format!(": {}", failed));
                ui.line(&line);
                report.push(line);
                None
            }
        };

        report.push(Line::separator());
        let elapsed = started.elapsed();

        info!(host = %addr, elapsed_ms = elapsed.as_millis() as u64, "host finished");

        HostResult {
            host,
            phase1,
            phase2,
            report,
            elapsed,
        }
    }
}

fn record_phase2(report: &mut Report, addr: &str, outcome: &Phase2Outcome, ui: &ScanUi) {
    match outcome {
        Phase2Outcome::Completed { output, exit_code } => {
            report.push_raw(output.clone());
            if *exit_code != Some(0) {
                let status = match exit_code {
                    Some(code) => format!("exited with status {}", code),
                    None => "was terminated by a signal".to_string(),
                };
                report.push(
                    Line::new()
                        .styled(Role::Warning, "Service detection for ")
                        .styled(Role::Highlight, addr)
                        .styled(Role::Warning, format!(" {}", status)),
                );
            }
            ui.line(&Line::new().styled(Role::Accent, addr).styled(Role::Info, " Nmapped successfully."));
        }
        Phase2Outcome::SpawnFailed(reason) => {
            let line = Line::new()
                .styled(Role::Warning, "Nmap failed for ")
                .styled(Role::Highlight, addr)
                .styled(Role::Warning, format!(": {}", reason));
            ui.line(&line);
            report.push(line);
        }
        Phase2Outcome::TimedOut(limit) => {
            let line = Line::new()
                .styled(Role::Warning, "Nmap timed out for ")
                .styled(Role::Highlight, addr)
                .styled(Role::Warning, format!(" after {}s", limit.as_secs()));
            ui.line(&line);
            report.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{strip_colors, Rendering};
    use crate::scanner::runner::testing::ScriptedRunner;
    use crate::scanner::runner::ProcessOutput;
    use std::path::Path;

    const CONFIG: &str = r#"
[portscan.phase1]
command = "scan {target} -i {iface} --rate {rate}"

[portscan.phase2]
command = "detect {target} -p {masscan_ports}"
"#;

    fn config() -> ScanConfig {
        ScanConfig::parse(CONFIG, Path::new("conf.toml")).unwrap()
    }

    fn respond_with(phase1_stdout: &'static str, phase2_stdout: &'static str) -> ScriptedRunner {
        ScriptedRunner::new(move |cmd| match cmd.program.as_str() {
            "scan" => Ok(ProcessOutput::ok(phase1_stdout)),
            _ => Ok(ProcessOutput::ok(phase2_stdout)),
        })
    }

    #[tokio::test]
    async fn test_end_to_end_single_host() {
        let runner = respond_with(
            "Discovered open port 80/tcp on 10.0.0.5\nDiscovered open port 22/tcp on 10.0.0.5\n",
            "Nmap scan report for 10.0.0.5\n22/tcp open ssh\n80/tcp open http\n",
        );
        let config = config();
        let scanner = HostScanner::new(&runner, &config, "eth0", NonZeroU32::new(500).unwrap());

        let ui = ScanUi::silent();
        let result = scanner.scan(Ipv4Addr::new(10, 0, 0, 5), &ui).await;

        assert_eq!(
            runner.calls(),
            vec!["scan 10.0.0.5 -i eth0 --rate 500", "detect 10.0.0.5 -p 22,80"]
        );
        assert_eq!(
            ui.recorded(),
            vec![
                "Masscanning target: 10.0.0.5",
                "Discovered open port 22/tcp on 10.0.0.5",
                "Discovered open port 80/tcp on 10.0.0.5",
                "10.0.0.5 Masscanned successfully.",
                "Nmapping target: 10.0.0.5",
                "10.0.0.5 Nmapped successfully.",
                "Scan has finished for 10.0.0.5",
            ]
        );
        assert_eq!(result.ports().map(|p| p.to_string()), Some("22,80".to_string()));
        assert!(matches!(result.phase2, Some(Phase2Outcome::Completed { .. })));

        let plain = result.report.render(Rendering::Plain);
        assert!(plain.starts_with("Nmap scan report for 10.0.0.5\n22/tcp open ssh\n80/tcp open http\n"));
        assert!(plain.contains("Time taken: 0 minutes and "));
        assert!(plain.ends_with(&format!("{}\n", "=".repeat(72))));

        let colored = result.report.render(Rendering::Colored);
        assert_eq!(strip_colors(&colored), plain);
    }

    #[tokio::test]
    async fn test_no_ports_skips_phase2() {
        let runner = respond_with("Starting masscan\nrate: 0.00-kpps\n", "unused");
        let config = config();
        let scanner = HostScanner::new(&runner, &config, "eth0", NonZeroU32::new(500).unwrap());

        let ui = ScanUi::silent();
        let result = scanner.scan(Ipv4Addr::new(10, 0, 0, 6), &ui).await;

        assert_eq!(runner.calls(), vec!["scan 10.0.0.6 -i eth0 --rate 500"]);
        assert_eq!(
            ui.recorded(),
            vec!["Masscanning target: 10.0.0.6", "No open TCP ports for 10.0.0.6"]
        );
        assert_eq!(result.phase1, Phase1Outcome::NoPortsFound);
        assert!(result.phase2.is_none());
        assert_eq!(
            result.report.render(Rendering::Plain),
            format!("No open TCP ports for 10.0.0.6\n{}\n", "=".repeat(72))
        );
    }

    #[tokio::test]
    async fn test_failed_phase1_is_reported() {
        let runner = ScriptedRunner::new(|_| {
            Ok(ProcessOutput {
                stdout: String::new(),
                exit_code: Some(1),
            })
        });
        let config = config();
        let scanner = HostScanner::new(&runner, &config, "tun0", NonZeroU32::new(1000).unwrap());

        let ui = ScanUi::silent();
        let result = scanner.scan(Ipv4Addr::new(10, 0, 0, 7), &ui).await;

        assert_eq!(runner.calls().len(), 1);
        assert!(!ui.recorded().iter().any(|line| line.starts_with("Scan has finished")));
        assert!(result.phase1.is_failure());
        assert!(result
            .report
            .render(Rendering::Plain)
            .starts_with("Masscan failed for 10.0.0.7: port scanner exited with status 1\n"));
    }

    #[tokio::test]
    async fn test_phase2_failure_exit_is_noted() {
        let runner = ScriptedRunner::new(|cmd| match cmd.program.as_str() {
            "scan" => Ok(ProcessOutput::ok("Discovered open port 443/tcp on 10.0.0.8")),
            _ => Ok(ProcessOutput {
                stdout: "partial\n".to_string(),
                exit_code: Some(3),
            }),
        });
        let config = config();
        let scanner = HostScanner::new(&runner, &config, "eth0", NonZeroU32::new(10).unwrap());

        let result = scanner.scan(Ipv4Addr::new(10, 0, 0, 8), &ScanUi::silent()).await;
        let plain = result.report.render(Rendering::Plain);
        assert!(plain.starts_with("partial\n\nService detection for 10.0.0.8 exited with status 3\n"));
    }
}
