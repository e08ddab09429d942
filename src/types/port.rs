//! Ports reported by the fast scanner.
//!
//! [`Port`] only holds 1-65535. [`PortList`] is what one host exposes:
//! unique and in ascending numeric order, which is also the order the
//! service scanner receives them in.

use std::fmt;
use std::str::FromStr;

/// A TCP port number, never 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(u16);

impl Port {
    /// `None` for port 0.
    #[inline]
    pub const fn new(number: u16) -> Option<Self> {
        match number {
            0 => None,
            n => Some(Self(n)),
        }
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(number: u16) -> Result<Self, Self::Error> {
        Self::new(number).ok_or(PortError::Zero)
    }
}

impl FromStr for Port {
    type Err = PortError;

    /// Accepts a bare decimal number, as found before the `/tcp` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>()
            .map_err(|_| PortError::NotANumber(s.to_string()))
            .and_then(Self::try_from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port 0 is not a valid TCP port")]
    Zero,

    #[error("'{0}' is not a port number")]
    NotANumber(String),
}

/// The open ports of a single host.
///
/// Always unique and sorted numerically, so `9,10,2` is held (and
/// rendered) as `2,9,10`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList {
    ports: Vec<Port>,
}

impl PortList {
    pub const fn new() -> Self {
        Self { ports: Vec::new() }
    }

    /// Add a port, keeping the list sorted and free of duplicates.
    ///
    /// Returns `false` if the port was already present.
    pub fn insert(&mut self, port: Port) -> bool {
        match self.ports.binary_search(&port) {
            Ok(_) => false,
            Err(at) => {
                self.ports.insert(at, port);
                true
            }
        }
    }

    pub fn contains(&self, port: Port) -> bool {
        self.ports.binary_search(&port).is_ok()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }
}

impl FromIterator<Port> for PortList {
    fn from_iter<I: IntoIterator<Item = Port>>(iter: I) -> Self {
        let mut ports: Vec<Port> = iter.into_iter().collect();
        ports.sort_unstable();
        ports.dedup();
        Self { ports }
    }
}

/// Comma-joined, no spaces: the form `{masscan_ports}` expands to.
impl fmt::Display for PortList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ports = self.ports.iter();
        if let Some(first) = ports.next() {
            write!(f, "{}", first)?;
            for port in ports {
                write!(f, ",{}", port)?;
            }
        }
        Ok(())
    }
}
