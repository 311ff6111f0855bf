//! Directory, DNS and reachability collaborators.
//!
//! This module defines the seams the audit reads its inventory through:
//! - [`DirectoryService`] - AD sites, subnets and domain controllers
//! - [`DnsRecordSource`] - zones and records hosted on each DC
//! - [`ReachabilityProbe`] - cheap liveness check before querying a DC
//!
//! Implementations:
//! - [`snapshot`] - JSON forest snapshot for offline runs and tests, and its recorder
//! - [`powershell`] - live queries through the AD and DnsServer modules
//! - [`probe`] - TCP and ping reachability probes

pub mod cli;
pub mod powershell;
pub mod probe;
pub mod snapshot;

use crate::models::{DomainController, RawRecord, RawSite, RawSubnet, Zone};
use std::error::Error;

/// Boxed error returned by collaborators; `Send` so it can leave worker threads.
pub type SourceError = Box<dyn Error + Send + Sync>;

pub trait DirectoryService {
    fn list_sites(&self) -> Result<Vec<RawSite>, SourceError>;
    fn list_subnets(&self) -> Result<Vec<RawSubnet>, SourceError>;
    fn list_domain_controllers(&self) -> Result<Vec<DomainController>, SourceError>;
}

pub trait DnsRecordSource: Send + Sync {
    fn list_zones(&self, dc: &DomainController) -> Result<Vec<Zone>, SourceError>;
    fn list_records(&self, dc: &DomainController, zone: &Zone)
        -> Result<Vec<RawRecord>, SourceError>;
}

pub trait ReachabilityProbe: Send + Sync {
    fn is_reachable(&self, host: &str) -> bool;
}

pub use powershell::PowerShellSource;
pub use probe::{PingProbe, TcpProbe};
pub use snapshot::{ForestSnapshot, SnapshotRecorder};
