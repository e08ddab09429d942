//! Saving reports to disk.

use super::report::{Rendering, Report};
use crate::error::{OutputError, OutputResult};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to the output path for the colored copy.
pub const COLORED_SUFFIX: &str = ".colored";

/// Path of the colored copy for a given output path.
pub fn colored_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(COLORED_SUFFIX);
    PathBuf::from(name)
}

/// Files written by [`save_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReport {
    pub plain: PathBuf,
    pub colored: PathBuf,
}

/// Write the plain report to `path` and the colored one next to it.
pub fn save_report(report: &Report, path: &Path) -> OutputResult<SavedReport> {
    let colored = colored_path(path);

    write(path, &report.render(Rendering::Plain))?;
    write(&colored, &report.render(Rendering::Colored))?;

    debug!(plain = %path.display(), colored = %colored.display(), "report saved");

    Ok(SavedReport {
        plain: path.to_path_buf(),
        colored,
    })
}

fn write(path: &Path, content: &str) -> OutputResult<()> {
    fs::write(path, content).map_err(|source| OutputError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{Line, Role};
    use crate::output::strip_colors;
    use tempfile::TempDir;

    fn sample() -> Report {
        let mut report = Report::new();
        report.push(
            Line::new()
                .styled(Role::Warning, "No open TCP ports for ")
                .styled(Role::Highlight, "10.0.0.9"),
        );
        report.push(Line::separator());
        report
    }

    #[test]
    fn test_colored_path() {
        assert_eq!(
            colored_path(Path::new("/tmp/scan.txt")),
            PathBuf::from("/tmp/scan.txt.colored")
        );
    }

    #[test]
    fn test_save_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");

        let saved = save_report(&sample(), &path).unwrap();
        assert_eq!(saved.colored, dir.path().join("report.txt.colored"));

        let plain = fs::read_to_string(&saved.plain).unwrap();
        let colored = fs::read_to_string(&saved.colored).unwrap();
        assert!(plain.starts_with("No open TCP ports for 10.0.0.9\n"));
        assert!(!plain.contains('\u{1b}'));
        assert!(colored.contains('\u{1b}'));
        assert_eq!(strip_colors(&colored), plain);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.txt");

        let err = save_report(&sample(), &path).unwrap_err();
        assert!(matches!(err, OutputError::WriteFailed { path: ref p, .. } if p == &path));
    }
}
