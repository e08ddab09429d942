//! Scanner command configuration.
//!
//! The config file is TOML with a `[portscan]` table holding one command
//! template per phase:
//!
//! ```toml
//! [portscan]
//! concurrency = 16
//!
//! [portscan.phase1]
//! command = "masscan {target} -p1-65535 -e {iface} --rate {rate}"
//! timeout_secs = 600
//!
//! [portscan.phase2]
//! command = "nmap -sC -sV -p {masscan_ports} {target}"
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::template::{CommandTemplate, Phase1Fields, Phase2Fields, TemplateFields};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default config file name, looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "conf.toml";

#[derive(Debug, Deserialize)]
struct RawConfig {
    portscan: RawPortscan,
}

#[derive(Debug, Deserialize)]
struct RawPortscan {
    phase1: RawPhase,
    phase2: RawPhase,
    #[serde(default)]
    concurrency: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawPhase {
    command: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// One validated phase: its command template and optional time limit.
#[derive(Debug, Clone)]
pub struct PhaseConfig<F> {
    pub template: CommandTemplate<F>,
    pub timeout: Option<Duration>,
}

impl<F: TemplateFields> PhaseConfig<F> {
    fn from_raw(raw: RawPhase) -> ConfigResult<Self> {
        let timeout = match raw.timeout_secs {
            Some(0) => return Err(ConfigError::NotPositive("timeout_secs")),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(Self {
            template: CommandTemplate::parse(raw.command)?,
            timeout,
        })
    }
}

/// The loaded scanner configuration. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Fast port scan.
    pub phase1: PhaseConfig<Phase1Fields>,
    /// Service detection.
    pub phase2: PhaseConfig<Phase2Fields>,
    /// Default worker pool size, if the file sets one.
    pub concurrency: Option<NonZeroUsize>,
    /// File this config was read from.
    pub source: PathBuf,
}

impl ScanConfig {
    /// Locate and load the config file.
    ///
    /// Tries `path` as given, then (for relative paths) next to the running
    /// executable, then the per-user config directory. The first file that
    /// exists is used; if it is invalid, loading fails without trying the
    /// remaining locations.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        Self::load_first(candidate_paths(path))
    }

    /// Load the first candidate that exists.
    fn load_first(candidates: Vec<PathBuf>) -> ConfigResult<Self> {
        match candidates.iter().find(|p| p.is_file()) {
            Some(found) => {
                info!(path = %found.display(), "loading config");
                Self::load_from(found)
            }
            None => Err(ConfigError::NotFound { tried: candidates }),
        }
    }

    /// Load the config from one specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::parse(&content, path)
    }

    /// Parse config text; `source` is only used for messages.
    pub fn parse(content: &str, source: &Path) -> ConfigResult<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
            path: source.to_path_buf(),
            reason: e.message().trim().to_string(),
        })?;

        let concurrency = match raw.portscan.concurrency {
            Some(n) => Some(NonZeroUsize::new(n).ok_or(ConfigError::NotPositive("concurrency"))?),
            None => None,
        };

        let config = Self {
            phase1: PhaseConfig::from_raw(raw.portscan.phase1)?,
            phase2: PhaseConfig::from_raw(raw.portscan.phase2)?,
            concurrency,
            source: source.to_path_buf(),
        };

        debug!(
            phase1 = config.phase1.template.as_str(),
            phase2 = config.phase2.template.as_str(),
            "config templates validated"
        );

        Ok(config)
    }
}

/// Locations searched for the config file, in order.
pub fn candidate_paths(path: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![path.to_path_buf()];

    if path.is_relative() {
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(dir.join(path));
        }
    }

    if let Some(project) = ProjectDirs::from("io", "omroot", "motorecon") {
        candidates.push(project.config_dir().join(DEFAULT_CONFIG_FILE));
    }

    candidates.dedup();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const SAMPLE: &str = r#"
[portscan.phase1]
command = "scan {target} -i {iface} --rate {rate}"

[portscan.phase2]
command = "detect {target} -p {masscan_ports}"
"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = ScanConfig::parse(SAMPLE, Path::new("conf.toml")).unwrap();
        assert_eq!(
            config.phase1.template.as_str(),
            "scan {target} -i {iface} --rate {rate}"
        );
        assert_eq!(
            config.phase2.template.as_str(),
            "detect {target} -p {masscan_ports}"
        );
        assert!(config.phase1.timeout.is_none());
        assert!(config.concurrency.is_none());
    }

    #[test]
    fn test_parse_optional_settings() {
        let content = r#"
[portscan]
concurrency = 4

[portscan.phase1]
command = "masscan {target} -e {iface} --rate {rate}"
timeout_secs = 120

[portscan.phase2]
command = "nmap -sV -p {masscan_ports} {target}"
timeout_secs = 900
"#;
        let config = ScanConfig::parse(content, Path::new("conf.toml")).unwrap();
        assert_eq!(config.concurrency, NonZeroUsize::new(4));
        assert_eq!(config.phase1.timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.phase2.timeout, Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_missing_phase_is_invalid() {
        let content = r#"
[portscan.phase1]
command = "masscan {target}"
"#;
        let err = ScanConfig::parse(content, Path::new("conf.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { .. }));
    }

    #[test]
    fn test_command_must_be_string() {
        let content = r#"
[portscan.phase1]
command = 42

[portscan.phase2]
command = "nmap {target}"
"#;
        let err = ScanConfig::parse(content, Path::new("conf.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { .. }));
    }

    #[test]
    fn test_unknown_placeholder_is_rejected() {
        let content = r#"
[portscan.phase1]
command = "masscan {target} --rate {speed}"

[portscan.phase2]
command = "nmap {target}"
"#;
        let err = ScanConfig::parse(content, Path::new("conf.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPlaceholder { phase: "phase1", .. }));
    }

    #[test]
    fn test_zero_values_are_rejected() {
        let content = SAMPLE.replace("[portscan.phase1]", "[portscan]\nconcurrency = 0\n\n[portscan.phase1]");
        let err = ScanConfig::parse(&content, Path::new("conf.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive("concurrency")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ScanConfig::load(file.path()).unwrap();
        assert_eq!(config.source.as_path(), file.path());
    }

    #[test]
    fn test_load_missing_reports_all_paths() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");

        match ScanConfig::load(&missing) {
            Err(ConfigError::NotFound { tried }) => assert_eq!(tried[0], missing),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_file_does_not_fall_through() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"portscan = \"oops\"").unwrap();

        let err = ScanConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { .. }));
    }

    #[test]
    fn test_later_candidate_is_loaded_when_earlier_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("conf.toml");
        let fallback = dir.path().join("exe").join("conf.toml");
        fs::create_dir_all(fallback.parent().unwrap()).unwrap();
        fs::write(&fallback, SAMPLE).unwrap();

        let config = ScanConfig::load_first(vec![missing, fallback.clone()]).unwrap();
        assert_eq!(config.source, fallback);
    }

    #[test]
    fn test_first_existing_candidate_wins_even_if_invalid() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("broken.toml");
        let valid = dir.path().join("valid.toml");
        fs::write(&broken, "[portscan.phase1]\ncommand = \"scan {target}\"\n").unwrap();
        fs::write(&valid, SAMPLE).unwrap();

        let err = ScanConfig::load_first(vec![broken, valid]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { .. }));
    }

    #[test]
    fn test_relative_path_falls_back_to_executable_dir() {
        let candidates = candidate_paths(Path::new("conf.toml"));
        assert_eq!(candidates[0], PathBuf::from("conf.toml"));

        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert!(candidates.contains(&exe_dir.join("conf.toml")));
    }

    #[test]
    fn test_absolute_path_skips_executable_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf.toml");
        let candidates = candidate_paths(&path);
        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(candidates[0], path);
        assert!(!candidates.contains(&exe_dir.join("conf.toml")));
    }
}
