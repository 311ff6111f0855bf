//! Domain models for the DNS site audit.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Ipv4`] - IPv4 network with CIDR notation support
//! - [`Subnet`] and [`Site`] - AD topology
//! - [`DomainController`], [`Zone`] and [`DnsRecord`] - DNS inventory
//! - [`MismatchRecord`] and [`DcProcessingSummary`] - audit results

mod dns;
mod ipv4;
mod mismatch;
mod subnet;

// Re-export public types
pub use dns::{DnsRecord, DomainController, RawRecord, RecordData, Zone};
pub use ipv4::{get_cidr_mask, parse_addr, Ipv4, ParseError, MAX_LENGTH};
pub use mismatch::{CountRow, DcProcessingSummary, DcStatus, MismatchRecord, MismatchType};
pub use subnet::{RawSite, RawSubnet, Site, Subnet};
