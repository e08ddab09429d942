//! Command templating.
//!
//! Scanner command lines come from the config file as strings with
//! `{name}` placeholders. [`substitute`] is the plain text operation;
//! [`CommandTemplate`] ties a template to the field set of one scan phase,
//! so a template is checked once when the config loads and can only be
//! rendered with every field it may mention.

use crate::error::{ConfigError, ConfigResult, TemplateError};
use crate::types::PortList;
use std::fmt;
use std::marker::PhantomData;
use std::net::Ipv4Addr;
use std::num::NonZeroU32;

/// Replace every `{name}` whose name appears in `pairs` with its value.
///
/// Unknown placeholders are left verbatim and substituted values are never
/// rescanned, so no other part of the template changes.
pub fn substitute(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        match placeholder_at(tail) {
            Some(name) => {
                let token_len = name.len() + 2;
                match pairs.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&tail[..token_len]),
                }
                rest = &tail[token_len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Names of all `{name}` placeholders in a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let tail = &rest[open..];
        match placeholder_at(tail) {
            Some(name) => {
                names.push(name);
                rest = &tail[name.len() + 2..];
            }
            None => rest = &tail[1..],
        }
    }

    names
}

/// If `s` starts with `{ident}`, return `ident`.
fn placeholder_at(s: &str) -> Option<&str> {
    let body = s.strip_prefix('{')?;
    let close = body.find('}')?;
    let name = &body[..close];
    let is_ident = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_ident.then_some(name)
}

/// The set of values one scan phase can substitute into its template.
pub trait TemplateFields {
    /// Phase name used in error messages.
    const PHASE: &'static str;
    /// Placeholder names this phase provides.
    const NAMES: &'static [&'static str];

    /// Placeholder values, one per entry in `NAMES`.
    fn values(&self) -> Vec<(&'static str, String)>;
}

/// Values for the fast port scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase1Fields {
    pub target: Ipv4Addr,
    pub iface: String,
    pub rate: NonZeroU32,
}

impl TemplateFields for Phase1Fields {
    const PHASE: &'static str = "phase1";
    const NAMES: &'static [&'static str] = &["target", "iface", "rate"];

    fn values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("target", self.target.to_string()),
            ("iface", self.iface.clone()),
            ("rate", self.rate.to_string()),
        ]
    }
}

/// Values for the service detection scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase2Fields {
    pub target: Ipv4Addr,
    pub masscan_ports: PortList,
}

impl TemplateFields for Phase2Fields {
    const PHASE: &'static str = "phase2";
    const NAMES: &'static [&'static str] = &["target", "masscan_ports"];

    fn values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("target", self.target.to_string()),
            ("masscan_ports", self.masscan_ports.to_string()),
        ]
    }
}

/// A command template validated against the fields of one phase.
pub struct CommandTemplate<F> {
    raw: String,
    _fields: PhantomData<fn(&F)>,
}

impl<F: TemplateFields> CommandTemplate<F> {
    /// Validate `raw` against the placeholders `F` provides.
    pub fn parse(raw: impl Into<String>) -> ConfigResult<Self> {
        let raw = raw.into();

        if let Some(unknown) = placeholders(&raw)
            .into_iter()
            .find(|name| !F::NAMES.contains(name))
        {
            return Err(ConfigError::UnknownPlaceholder {
                phase: F::PHASE,
                name: unknown.to_string(),
            });
        }

        if !placeholders(&raw).contains(&"target") {
            return Err(ConfigError::MissingTarget { phase: F::PHASE });
        }

        Ok(Self {
            raw,
            _fields: PhantomData,
        })
    }

    /// The template as written in the config file.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Substitute every field into the template.
    pub fn render(&self, fields: &F) -> String {
        let values = fields.values();
        let pairs: Vec<(&str, &str)> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();
        substitute(&self.raw, &pairs)
    }

    /// Render and split into program and arguments.
    pub fn command_line(&self, fields: &F) -> Result<CommandLine, TemplateError> {
        CommandLine::parse(&self.render(fields))
    }
}

impl<F> Clone for CommandTemplate<F> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _fields: PhantomData,
        }
    }
}

impl<F> fmt::Debug for CommandTemplate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandTemplate").field(&self.raw).finish()
    }
}

/// A program and its arguments, ready to spawn without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split a rendered command on whitespace.
    pub fn parse(rendered: &str) -> Result<Self, TemplateError> {
        let mut words = rendered.split_whitespace().map(str::to_string);
        let program = words.next().ok_or(TemplateError::EmptyCommand)?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
