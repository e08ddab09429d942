//! Scan targets.
//!
//! A target is what the user types on the command line: one IPv4 address
//! (`10.10.10.5`) or an IPv4 CIDR block (`10.10.10.0/24`). Blocks expand
//! to every address they span, network and broadcast included.

use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("'{0}' is not an IPv4 address")]
    InvalidFormat(String),

    #[error("'{0}' is not a valid IPv4 CIDR block")]
    InvalidCidr(String),
}

/// One host or a block of hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    Single(Ipv4Addr),
    Cidr(Ipv4Network),
}

impl TargetSpec {
    /// Hostnames and IPv6 are rejected; only dotted-quad input is accepted.
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let input = input.trim();

        match input.split_once('/') {
            None => input
                .parse::<Ipv4Addr>()
                .map(Self::Single)
                .map_err(|_| TargetError::InvalidFormat(input.to_string())),
            Some((addr, _)) if addr.parse::<Ipv4Addr>().is_err() => {
                Err(TargetError::InvalidFormat(input.to_string()))
            }
            Some(_) => input
                .parse::<Ipv4Network>()
                .map(Self::Cidr)
                .map_err(|_| TargetError::InvalidCidr(input.to_string())),
        }
    }

    /// Every address this target covers, lowest first.
    ///
    /// Walks the block as a `u32` range so even `/0` expands lazily.
    pub fn hosts(&self) -> Box<dyn Iterator<Item = Ipv4Addr> + Send> {
        match *self {
            Self::Single(addr) => Box::new(std::iter::once(addr)),
            Self::Cidr(block) => {
                let first = u32::from(block.network());
                let last = u32::from(block.broadcast());
                Box::new((first..=last).map(Ipv4Addr::from))
            }
        }
    }

    pub fn host_count(&self) -> u64 {
        match self {
            Self::Single(_) => 1,
            Self::Cidr(block) => 1u64 << (32 - u32::from(block.prefix())),
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(addr) => fmt::Display::fmt(addr, f),
            Self::Cidr(block) => fmt::Display::fmt(block, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(input: &str) -> Vec<Ipv4Addr> {
        TargetSpec::parse(input).unwrap().hosts().collect()
    }

    #[test]
    fn test_single_address() {
        assert_eq!(
            TargetSpec::parse(" 10.10.10.5 ").unwrap(),
            TargetSpec::Single(Ipv4Addr::new(10, 10, 10, 5))
        );
        assert_eq!(hosts("10.10.10.5"), vec![Ipv4Addr::new(10, 10, 10, 5)]);
    }

    #[test]
    fn test_non_ipv4_is_invalid_format() {
        for input in ["::1", "example.com", "10.0.0.300", "example.com/24", "fe80::/64", ""] {
            assert!(
                matches!(TargetSpec::parse(input), Err(TargetError::InvalidFormat(_))),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_bad_prefix_is_invalid_cidr() {
        for input in ["10.0.0.0/33", "10.0.0.0/", "10.0.0.0/x"] {
            assert!(
                matches!(TargetSpec::parse(input), Err(TargetError::InvalidCidr(_))),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_slash_32_is_one_host() {
        let spec = TargetSpec::parse("10.0.0.5/32").unwrap();
        assert_eq!(spec.host_count(), 1);
        assert_eq!(hosts("10.0.0.5/32"), vec![Ipv4Addr::new(10, 0, 0, 5)]);
    }

    #[test]
    fn test_expansion_matches_prefix() {
        for (input, expected) in [("10.0.0.0/24", 256u64), ("10.0.0.0/30", 4), ("10.0.0.0/31", 2)] {
            let spec = TargetSpec::parse(input).unwrap();
            assert_eq!(spec.hosts().count() as u64, expected, "{}", input);
            assert_eq!(spec.host_count(), expected, "{}", input);
        }
    }

    #[test]
    fn test_whole_address_space_expands_lazily() {
        let spec = TargetSpec::parse("0.0.0.0/0").unwrap();
        assert_eq!(spec.host_count(), 1u64 << 32);

        let first: Vec<Ipv4Addr> = spec.hosts().take(3).collect();
        assert_eq!(
            first,
            vec![Ipv4Addr::new(0, 0, 0, 0), Ipv4Addr::new(0, 0, 0, 1), Ipv4Addr::new(0, 0, 0, 2)]
        );
    }

    #[test]
    fn test_unaligned_block_starts_at_network() {
        let all = hosts("10.0.0.5/30");
        assert_eq!(all.first(), Some(&Ipv4Addr::new(10, 0, 0, 4)));
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_network_and_broadcast_are_scanned() {
        let all = hosts("192.168.7.0/24");
        assert_eq!(all.first(), Some(&Ipv4Addr::new(192, 168, 7, 0)));
        assert_eq!(all.last(), Some(&Ipv4Addr::new(192, 168, 7, 255)));
    }

    #[test]
    fn test_display_round_trips_input() {
        assert_eq!(TargetSpec::parse("10.1.2.0/24").unwrap().to_string(), "10.1.2.0/24");
        assert_eq!(TargetSpec::parse("10.1.2.3").unwrap().to_string(), "10.1.2.3");
    }
}
