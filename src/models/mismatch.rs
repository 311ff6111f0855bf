//! Audit output models: mismatch findings and per-DC processing status.

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::fmt;

/// Why a record was flagged.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MismatchType {
    /// The address classifies to a site other than the DC's.
    DifferentSite,
    /// No configured subnet contains the address.
    UnmatchedSubnet,
}

/// One DNS A record whose address does not belong to the hosting DC's site.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MismatchRecord {
    #[serde(rename = "DCName")]
    pub dc_name: String,
    #[serde(rename = "DCSite")]
    pub dc_site: String,
    #[serde(rename = "DCIP")]
    pub dc_ip: String,
    pub zone: String,
    pub record_name: String,
    #[serde(rename = "FQDN")]
    pub fqdn: String,
    pub record_type: String,
    #[serde(rename = "IPAddress")]
    pub ip_address: String,
    /// Classified site, or "Unmatched".
    #[serde(rename = "IPSite")]
    pub ip_site: String,
    #[serde(rename = "IPSubnet")]
    pub ip_subnet: String,
    #[serde(rename = "IPLocation")]
    pub ip_location: String,
    pub mismatch_type: MismatchType,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub is_static: bool,
    pub timestamp: DateTime<Local>,
}

/// Outcome of processing one DC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DcStatus {
    Completed,
    Failed(String),
}

impl DcStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, DcStatus::Failed(_))
    }
}

impl fmt::Display for DcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DcStatus::Completed => write!(f, "Completed"),
            DcStatus::Failed(reason) => write!(f, "Failed: {reason}"),
        }
    }
}

impl Serialize for DcStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Per-DC processing summary row.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DcProcessingSummary {
    #[serde(rename = "DCName")]
    pub dc_name: String,
    #[serde(rename = "DCSite")]
    pub dc_site: String,
    #[serde(rename = "DCIP")]
    pub dc_ip: String,
    pub status: DcStatus,
    pub mismatch_count: usize,
    pub zones_processed: usize,
    pub zones_failed: usize,
    pub duration_seconds: f64,
}

/// A grouped count, e.g. mismatches per site.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub name: String,
    pub count: usize,
}
