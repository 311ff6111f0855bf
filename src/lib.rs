//! Audit AD-integrated DNS for A records whose address belongs to another
//! AD site than the domain controller hosting them.
//!
//! The heart of the crate is [`processing::classify_ip`], which maps an IPv4
//! address to the AD site whose subnet contains it. Around it:
//! - [`models`] - typed inventory and result records
//! - [`source`] - directory, DNS and reachability collaborators
//! - [`processing`] - subnet table, classifier, detector and orchestrator
//! - [`output`] - CSV/JSON reports and the terminal summary

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod processing;
pub mod source;

pub use error::AuditError;

use config::AuditConfig;
use models::{DomainController, Site};
use processing::{
    build_site_inventory, build_subnet_table, find_overlapping_subnets, log_overlapping_subnets,
    resolve_dc_sites, run_audit, AuditOutcome, SubnetTable,
};
use source::{DirectoryService, DnsRecordSource, ReachabilityProbe};
use std::future::Future;
use std::sync::Arc;

/// Directory inventory one audit runs against.
#[derive(Debug, Clone)]
pub struct Forest {
    pub sites: Vec<Site>,
    pub table: SubnetTable,
    pub dcs: Vec<DomainController>,
}

/// Read sites, subnets and DCs and build the subnet table.
///
/// Fails when the directory cannot be queried or returns no sites or no DCs.
pub fn load_forest(directory: &dyn DirectoryService) -> Result<Forest, AuditError> {
    let raw_sites = directory
        .list_sites()
        .map_err(|e| AuditError::DirectoryUnavailable(e.to_string()))?;
    if raw_sites.is_empty() {
        return Err(AuditError::NoSites);
    }
    let raw_subnets = directory
        .list_subnets()
        .map_err(|e| AuditError::DirectoryUnavailable(e.to_string()))?;
    let dcs = directory
        .list_domain_controllers()
        .map_err(|e| AuditError::DirectoryUnavailable(e.to_string()))?;
    if dcs.is_empty() {
        return Err(AuditError::NoDomainControllers);
    }
    log::info!(
        "Directory: {} sites, {} subnets, {} DCs",
        raw_sites.len(),
        raw_subnets.len(),
        dcs.len()
    );

    let table = build_subnet_table(&raw_subnets);
    if table.is_empty() {
        log::warn!("No usable subnets; every address will be unmatched");
    }
    log_overlapping_subnets(&find_overlapping_subnets(&table));
    let sites = build_site_inventory(&raw_sites, &table);
    let dcs = resolve_dc_sites(dcs, &table);

    Ok(Forest { sites, table, dcs })
}

/// Load the forest and run the audit over every DC.
pub async fn audit_forest(
    directory: &dyn DirectoryService,
    dns: Arc<dyn DnsRecordSource>,
    probe: Arc<dyn ReachabilityProbe>,
    config: AuditConfig,
) -> Result<(Forest, AuditOutcome), AuditError> {
    let forest = load_forest(directory)?;
    let outcome = run_audit(
        forest.dcs.clone(),
        Arc::new(forest.table.clone()),
        dns,
        probe,
        config,
    )
    .await;
    Ok((forest, outcome))
}

/// Drive `future` to completion on a multi-thread runtime.
///
/// DC workers abandoned after a timeout are not waited for when the runtime
/// goes away, so a hung DC cannot hold the process open.
pub fn block_on<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawRecord, Zone};
    use crate::source::{ForestSnapshot, SourceError};
    use std::time::{Duration, Instant};

    /// Never answers within any reasonable DC timeout.
    struct HungDns;

    impl DnsRecordSource for HungDns {
        fn list_zones(&self, _dc: &DomainController) -> Result<Vec<Zone>, SourceError> {
            std::thread::sleep(Duration::from_secs(5));
            Ok(Vec::new())
        }

        fn list_records(
            &self,
            _dc: &DomainController,
            _zone: &Zone,
        ) -> Result<Vec<RawRecord>, SourceError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_load_forest_from_snapshot() {
        let snapshot = ForestSnapshot::load("src/tests/test_data/forest_snapshot_01.json")
            .expect("Error reading snapshot");
        let forest = load_forest(&snapshot).expect("forest should load");
        // one of the fixture subnets is malformed
        assert_eq!(forest.table.len(), snapshot.subnets.len() - 1);
        let dc4 = forest.dcs.iter().find(|dc| dc.name == "DC4").unwrap();
        assert_eq!(dc4.site, "SiteA");
    }

    #[test]
    fn test_load_forest_setup_failures() {
        let empty = ForestSnapshot::default();
        assert!(matches!(load_forest(&empty), Err(AuditError::NoSites)));

        let mut no_dcs = ForestSnapshot::load("src/tests/test_data/forest_snapshot_01.json")
            .expect("Error reading snapshot");
        no_dcs.domain_controllers.clear();
        assert!(matches!(load_forest(&no_dcs), Err(AuditError::NoDomainControllers)));
    }

    #[test]
    fn test_block_on_does_not_wait_for_hung_dc() {
        let snapshot = Arc::new(
            ForestSnapshot::load("src/tests/test_data/forest_snapshot_01.json")
                .expect("Error reading snapshot"),
        );
        let config = AuditConfig {
            dc_timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let started = Instant::now();
        let (_, outcome) = block_on(audit_forest(
            snapshot.as_ref(),
            Arc::new(HungDns),
            snapshot.clone(),
            config,
        ))
        .expect("runtime")
        .expect("audit should run");

        assert!(started.elapsed() < Duration::from_secs(3), "{:?}", started.elapsed());
        let dc1 = &outcome.dc_stats[0];
        assert!(dc1.status.to_string().starts_with("Failed: timed out"), "{}", dc1.status);
    }
}
