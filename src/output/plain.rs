//! Terminal output.
//!
//! Status messages, the live scan feed and the final report.

use super::report::{Line, Rendering, Report};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Live feed shown while hosts are being scanned.
///
/// Owns a progress bar counting finished hosts; status lines are printed
/// above it. When stdout is not a terminal the bar stays hidden and lines
/// go straight to stdout.
pub struct ScanUi {
    bar: ProgressBar,
    quiet: bool,
    #[cfg(test)]
    recorded: std::sync::Mutex<Vec<String>>,
}

impl ScanUi {
    /// Create the feed for a sweep over `hosts` hosts.
    pub fn new(hosts: u64, quiet: bool) -> Self {
        let bar = if quiet || !console::Term::stdout().is_term() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(hosts);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} hosts")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            bar
        };

        Self {
            bar,
            quiet,
            #[cfg(test)]
            recorded: Default::default(),
        }
    }

    /// A feed that prints nothing.
    pub fn silent() -> Self {
        Self::new(0, true)
    }

    /// Print a status line.
    pub fn line(&self, line: &Line) {
        #[cfg(test)]
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(line.render(Rendering::Plain));
        }

        if self.quiet {
            return;
        }

        let text = line.render(terminal_rendering());
        if self.bar.is_hidden() {
            println!("{}", text);
        } else {
            self.bar.println(text);
        }
    }

    /// Count one host as finished.
    pub fn host_done(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Every status line handed to this feed, shown or not.
    #[cfg(test)]
    pub(crate) fn recorded(&self) -> Vec<String> {
        self.recorded.lock().unwrap().clone()
    }
}

/// Colored when the terminal supports it.
pub fn terminal_rendering() -> Rendering {
    if console::colors_enabled() {
        Rendering::Colored
    } else {
        Rendering::Plain
    }
}

/// Print the aggregate report.
pub fn print_report(report: &Report) {
    print!("{}", report.render(terminal_rendering()));
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}
