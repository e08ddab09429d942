//! Styled report model.
//!
//! A report is a list of lines, each made of segments tagged with a
//! semantic [`Role`]. Roles only turn into terminal escape codes when a
//! report is rendered with [`Rendering::Colored`].

use super::style::style_for;
use crate::types::{Port, PortList};
use std::time::Duration;

/// Width of the separator closing each host block.
const SEPARATOR_WIDTH: usize = 72;

/// Semantic styling of a report segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Host addresses and discovered ports.
    Highlight,
    /// Failures and empty results.
    Warning,
    /// Labels and regular status text.
    Info,
    /// Values inside status messages.
    Accent,
    /// Separators and secondary text.
    Muted,
}

/// How a report is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// With ANSI color codes.
    Colored,
    /// Text only.
    Plain,
}

/// A run of text with an optional role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub role: Option<Role>,
    pub text: String,
}

/// One report line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    segments: Vec<Segment>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unstyled text.
    pub fn plain(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment {
            role: None,
            text: text.into(),
        });
        self
    }

    /// Append text with a role.
    pub fn styled(mut self, role: Role, text: impl Into<String>) -> Self {
        self.segments.push(Segment {
            role: Some(role),
            text: text.into(),
        });
        self
    }

    /// The closing separator of a host block.
    pub fn separator() -> Self {
        Self::new().styled(Role::Muted, "=".repeat(SEPARATOR_WIDTH))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn render(&self, rendering: Rendering) -> String {
        self.segments
            .iter()
            .map(|segment| match (rendering, segment.role) {
                (Rendering::Colored, Some(role)) => {
                    style_for(role).apply_to(&segment.text).to_string()
                }
                _ => segment.text.clone(),
            })
            .collect()
    }

    fn highlight(&mut self, target: &str, ports: &PortList) {
        self.segments = std::mem::take(&mut self.segments)
            .into_iter()
            .flat_map(|segment| match segment.role {
                None => highlight_text(&segment.text, target, ports),
                Some(_) => vec![segment],
            })
            .collect();
    }
}

/// An ordered collection of report lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    lines: Vec<Line>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// Add captured program output as it is.
    pub fn push_raw(&mut self, text: impl Into<String>) {
        self.lines.push(Line::new().plain(text));
    }

    /// Move all lines of `other` to the end of this report.
    pub fn append(&mut self, other: &mut Report) {
        self.lines.append(&mut other.lines);
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Mark every standalone occurrence of `target`, and of each port in
    /// `ports` written as `PORT/tcp`, in the unstyled parts of the report.
    pub fn highlight(&mut self, target: &str, ports: &PortList) {
        for line in &mut self.lines {
            line.highlight(target, ports);
        }
    }

    /// Render every line followed by a newline.
    pub fn render(&self, rendering: Rendering) -> String {
        self.lines
            .iter()
            .map(|line| line.render(rendering) + "\n")
            .collect()
    }
}

impl FromIterator<Report> for Report {
    fn from_iter<I: IntoIterator<Item = Report>>(iter: I) -> Self {
        let mut all = Report::new();
        for mut report in iter {
            all.append(&mut report);
        }
        all
    }
}

/// Format a duration as `M minutes and S.SS seconds`.
///
/// Rounded to hundredths first, so 59.999s reads as one minute rather than
/// `60.00` seconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    let centis = (elapsed.as_secs_f64() * 100.0).round() as u64;
    let (minutes, rest) = (centis / 6000, centis % 6000);
    format!("{} minutes and {}.{:02} seconds", minutes, rest / 100, rest % 100)
}

/// Split `text` into plain and highlighted segments.
///
/// A match must not be glued to surrounding digits, so `80/tcp` is not
/// found inside `8080/tcp` and `10.0.0.1` is not found inside `10.0.0.15`.
fn highlight_text(text: &str, target: &str, ports: &PortList) -> Vec<Segment> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let after_digit = i > 0 && bytes[i - 1].is_ascii_digit();
        if let Some(len) = (!after_digit).then(|| match_at(bytes, i, target, ports)).flatten() {
            if plain_start < i {
                segments.push(Segment {
                    role: None,
                    text: text[plain_start..i].to_string(),
                });
            }
            segments.push(Segment {
                role: Some(Role::Highlight),
                text: text[i..i + len].to_string(),
            });
            i += len;
            plain_start = i;
        } else {
            i += 1;
        }
    }

    if plain_start < bytes.len() || segments.is_empty() {
        segments.push(Segment {
            role: None,
            text: text[plain_start..].to_string(),
        });
    }

    segments
}

/// Length of the highlightable token starting at `i`, if any.
fn match_at(bytes: &[u8], i: usize, target: &str, ports: &PortList) -> Option<usize> {
    let rest = &bytes[i..];

    if !target.is_empty() && rest.starts_with(target.as_bytes()) {
        let glued = rest.get(target.len()).is_some_and(u8::is_ascii_digit);
        if !glued {
            return Some(target.len());
        }
    }

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 && rest[digits..].starts_with(b"/tcp") {
        let port: Port = std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()?;
        if ports.contains(port) {
            return Some(digits);
        }
    }

    None
}
