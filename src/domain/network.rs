// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants
//!
//! Address arithmetic used by network components: parsing the VPC block,
//! carving per-subnet `/24` blocks and naming availability zones.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Availability zone suffixes, one per subnet
pub const ZONE_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32)")]
    InvalidPrefixLength(u8),

    #[error("Block {block} is too small to carve /24 subnets (prefix must be at most /{max})")]
    BlockTooSmall { block: String, max: u8 },

    #[error("Subnet index {0} is outside the 0-255 range of /24 blocks")]
    SubnetIndexOutOfRange(usize),

    #[error("No availability zone letter for subnet index {0}")]
    NoAvailabilityZone(usize),
}

/// IPv4 block in CIDR notation
///
/// Invariants:
/// - Valid dotted-quad address
/// - Prefix length present and at most 32
///
/// # Examples
///
/// ```rust
/// use cim_compose::domain::Ipv4Cidr;
///
/// let block = Ipv4Cidr::new("10.0.0.0/16").unwrap();
/// assert_eq!(block.prefix_length(), 16);
/// assert_eq!(block.subnet_24(2).unwrap().to_string(), "10.0.2.0/24");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix_length: u8,
}

impl Ipv4Cidr {
    /// Largest prefix that still leaves room for 256 `/24` subnets
    pub const MAX_CARVABLE_PREFIX: u8 = 16;

    /// Parse `a.b.c.d/n`
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        if prefix_length > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    /// Get the network address
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Get the prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Whether `/24` subnets can be carved from this block
    pub fn ensure_carvable(&self) -> Result<(), NetworkError> {
        if self.prefix_length > Self::MAX_CARVABLE_PREFIX {
            return Err(NetworkError::BlockTooSmall {
                block: self.to_string(),
                max: Self::MAX_CARVABLE_PREFIX,
            });
        }
        Ok(())
    }

    /// The `index`-th `/24` block: `<a>.<b>.<index>.0/24`
    pub fn subnet_24(&self, index: usize) -> Result<Ipv4Cidr, NetworkError> {
        self.ensure_carvable()?;
        let third = u8::try_from(index).map_err(|_| NetworkError::SubnetIndexOutOfRange(index))?;
        let [a, b, _, _] = self.address.octets();

        Ok(Self {
            address: Ipv4Addr::new(a, b, third, 0),
            prefix_length: 24,
        })
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_length)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Availability zone for the `index`-th subnet of `region`
///
/// ```rust
/// use cim_compose::domain::availability_zone;
///
/// assert_eq!(availability_zone("eu-central-1", 1).unwrap(), "eu-central-1b");
/// ```
pub fn availability_zone(region: &str, index: usize) -> Result<String, NetworkError> {
    ZONE_LETTERS
        .chars()
        .nth(index)
        .map(|letter| format!("{region}{letter}"))
        .ok_or(NetworkError::NoAvailabilityZone(index))
}
