//! IPv4 address to AD site classification.

use super::SubnetTable;
use crate::models::parse_addr;
use std::net::Ipv4Addr;

/// Result of classifying one address against the subnet table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The first subnet containing the address.
    Site {
        name: String,
        subnet_key: String,
        location: Option<String>,
    },
    /// No configured subnet contains the address.
    Unmatched,
    /// The input was not a dotted-quad IPv4 address.
    Invalid,
}

/// Classify a textual address. Unparseable input gives [`Classification::Invalid`].
pub fn classify_ip(ip: &str, table: &SubnetTable) -> Classification {
    match parse_addr(ip) {
        Ok(addr) => classify_addr(addr, table),
        Err(_) => Classification::Invalid,
    }
}

/// Classify an address, returning the first containing subnet in table order.
///
/// Overlapping subnets resolve by table order, not longest prefix.
pub fn classify_addr(addr: Ipv4Addr, table: &SubnetTable) -> Classification {
    table
        .iter()
        .find(|subnet| subnet.cidr.contains(addr))
        .map(|subnet| Classification::Site {
            name: subnet.site.clone(),
            subnet_key: subnet.key.clone(),
            location: subnet.location.clone(),
        })
        .unwrap_or(Classification::Unmatched)
}
