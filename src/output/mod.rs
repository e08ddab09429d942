//! Output formatting module.
//!
//! Builds styled reports, prints them to the terminal and saves plain and
//! colored copies to disk.

mod file;
mod plain;
pub mod report;
mod style;

pub use file::{colored_path, save_report, SavedReport, COLORED_SUFFIX};
pub use plain::{
    print_error, print_info, print_report, print_success, print_warning, terminal_rendering,
    ScanUi,
};
pub use report::{format_elapsed, Line, Rendering, Report, Role};

/// Remove terminal color codes from `text`.
pub fn strip_colors(text: &str) -> String {
    console::strip_ansi_codes(text).into_owned()
}
