//! Audit processing logic.
//!
//! This module contains the site classification engine and the audit built on it:
//! - [`subnet_table`] - Building the CIDR to site lookup table
//! - [`classifier`] - Classifying an IPv4 address against the table
//! - [`detector`] - Finding site mismatches in one DC's records
//! - [`orchestrator`] - Running detection across all DCs
//! - [`overlap`] - Reporting subnets that shadow each other
//! - [`inventory`] - Grouping subnets by site

mod classifier;
mod detector;
mod inventory;
mod orchestrator;
mod overlap;
mod subnet_table;

// Re-export public functions
pub use classifier::{classify_addr, classify_ip, Classification};
pub use detector::{
    collect_dc_mismatches, detect_mismatches, is_excluded_address, zone_selected, DcCollection,
    DetectOptions, UNMATCHED_SITE,
};
pub use inventory::build_site_inventory;
pub use orchestrator::{
    resolve_dc_sites, run_audit, summarize_by_dc, summarize_by_site, AuditOutcome,
};
pub use overlap::{find_overlapping_subnets, log_overlapping_subnets, OverlapConflict};
pub use subnet_table::{build_subnet_table, parse_subnet, SubnetTable};
