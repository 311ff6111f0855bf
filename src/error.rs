//! Fatal audit errors.
//!
//! Everything recoverable (bad subnet, unreachable DC, failing zone) is
//! logged and recorded in the per-DC status instead of surfacing here.

use std::fmt;

#[derive(Debug)]
pub enum AuditError {
    /// The directory service could not be queried.
    DirectoryUnavailable(String),
    /// The directory returned no domain controllers.
    NoDomainControllers,
    /// The directory returned no sites.
    NoSites,
    /// Reports could not be written.
    Report(String),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::DirectoryUnavailable(e) => write!(f, "directory service unavailable: {e}"),
            AuditError::NoDomainControllers => write!(f, "no domain controllers found"),
            AuditError::NoSites => write!(f, "no AD sites found"),
            AuditError::Report(e) => write!(f, "report export failed: {e}"),
        }
    }
}

impl std::error::Error for AuditError {}
