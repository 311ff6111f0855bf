//! IPv4 address and CIDR notation utilities.
//!
//! Provides [`Ipv4`] for representing a network address with its prefix
//! length, along with the mask arithmetic used by the site classifier.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Why a CIDR string or dotted-quad address was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The network part is not exactly four octets in 0..=255.
    InvalidAddress(String),
    /// The prefix part is not an integer in 0..=32.
    InvalidPrefix(String),
    /// The string could not be split into network and prefix parts.
    MissingPrefix(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidAddress(s) => write!(f, "invalid IPv4 address: '{s}'"),
            ParseError::InvalidPrefix(s) => write!(f, "invalid prefix length: '{s}'"),
            ParseError::MissingPrefix(s) => write!(f, "invalid CIDR format: '{s}'"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// A prefix of 0 gives an empty mask, so every address matches.
///
/// # Examples
/// ```
/// use ad_dns_site_audit::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// assert_eq!(get_cidr_mask(0).unwrap(), 0);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, ParseError> {
    match len {
        0 => Ok(0),
        1..=MAX_LENGTH => Ok(u32::MAX << (MAX_LENGTH - len)),
        _ => Err(ParseError::InvalidPrefix(len.to_string())),
    }
}

/// Parse a dotted-quad address, requiring exactly four decimal octets.
pub fn parse_addr(input: &str) -> Result<Ipv4Addr, ParseError> {
    let input = input.trim();
    let octets: Vec<&str> = input.split('.').collect();
    if octets.len() != 4 {
        return Err(ParseError::InvalidAddress(input.to_string()));
    }
    let mut bytes = [0u8; 4];
    for (byte, octet) in bytes.iter_mut().zip(octets) {
        if octet.is_empty() || !octet.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::InvalidAddress(input.to_string()));
        }
        *byte = octet
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidAddress(input.to_string()))?;
    }
    Ok(Ipv4Addr::from(bytes))
}

/// IPv4 network with CIDR notation support.
///
/// `addr` is kept exactly as supplied, so `192.168.1.5/24` stays
/// non-canonical. All containment checks mask both sides.
#[derive(Eq, Ord, Debug, Copy, Clone, Hash, PartialEq, PartialOrd)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(de::Error::custom)
    }
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, ParseError> {
        let addr_cidr = addr_cidr.trim();
        let parts: Vec<&str> = addr_cidr.split('/').collect();
        if parts.len() != 2 {
            return Err(ParseError::MissingPrefix(addr_cidr.to_string()));
        }
        let addr = parse_addr(parts[0])?;
        let prefix = parts[1].trim();
        let mask: u8 = prefix
            .parse()
            .map_err(|_| ParseError::InvalidPrefix(prefix.to_string()))?;
        if mask > MAX_LENGTH {
            return Err(ParseError::InvalidPrefix(prefix.to_string()));
        }
        Ok(Ipv4 { addr, mask })
    }

    /// Mask for this prefix length.
    pub fn netmask(&self) -> u32 {
        // mask is validated on construction
        get_cidr_mask(self.mask).unwrap_or(u32::MAX)
    }

    /// True when `ip` falls inside this network.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let mask = self.netmask();
        u32::from(ip) & mask == u32::from(self.addr) & mask
    }

    /// True when every address of `other` is also inside `self`.
    pub fn covers(&self, other: &Ipv4) -> bool {
        self.mask <= other.mask && self.contains(other.lo())
    }

    /// True when the stored address already equals its own network address.
    pub fn is_canonical(&self) -> bool {
        self.addr == self.lo()
    }

    /// Get the lowest (network) address in the subnet.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.netmask())
    }
}

impl FromStr for Ipv4 {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
