//! JSON forest snapshot.
//!
//! A snapshot captures everything the audit reads from the directory and the
//! DNS servers, so a run can be replayed offline.

use super::{DirectoryService, DnsRecordSource, ReachabilityProbe, SourceError};
use crate::models::{DomainController, RawRecord, RawSite, RawSubnet, Zone};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Directory and DNS inventory of one forest at one point in time.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct ForestSnapshot {
    #[serde(default)]
    pub sites: Vec<RawSite>,
    #[serde(default)]
    pub subnets: Vec<RawSubnet>,
    #[serde(default)]
    pub domain_controllers: Vec<DomainController>,
    /// Zones by DC name.
    #[serde(default)]
    pub zones: BTreeMap<String, Vec<Zone>>,
    /// Records by DC name, then zone name.
    #[serde(default)]
    pub records: BTreeMap<String, BTreeMap<String, Vec<RawRecord>>>,
    /// Hosts (DC names or addresses) that did not answer when captured.
    #[serde(default)]
    pub unreachable: BTreeSet<String>,
}

impl ForestSnapshot {
    /// Read a snapshot file.
    pub fn load(file: &str) -> Result<ForestSnapshot, SourceError> {
        if !Path::new(file).exists() {
            return Err(format!("Snapshot file does not exist: {file}").into());
        }
        log::info!("Reading forest snapshot: {file}");
        let json = std::fs::read_to_string(file)
            .map_err(|e| format!("Error reading snapshot {file}: {e}"))?;
        ForestSnapshot::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<ForestSnapshot, SourceError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let snapshot: ForestSnapshot = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|e| format!("Error parsing snapshot: path={} error={}", e.path(), e))?;
        Ok(snapshot)
    }

    /// Write the snapshot as pretty JSON.
    pub fn save(&self, file: &str) -> Result<(), SourceError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Error serializing snapshot: {e}"))?;
        log::warn!("Writing forest snapshot: {file}");
        std::fs::write(file, json).map_err(|e| format!("Error writing snapshot {file}: {e}"))?;
        Ok(())
    }

    /// Read the directory part of a snapshot: sites, subnets and DCs.
    pub fn capture_directory(
        directory: &dyn DirectoryService,
    ) -> Result<ForestSnapshot, SourceError> {
        Ok(ForestSnapshot {
            sites: directory.list_sites()?,
            subnets: directory.list_subnets()?,
            domain_controllers: directory.list_domain_controllers()?,
            ..Default::default()
        })
    }
}

/// Delegates to live collaborators and keeps what they answer, so an audit
/// run doubles as a snapshot capture.
///
/// Only successful answers are kept; zones or DCs that failed are absent from
/// the snapshot and fail the same way when it is replayed.
pub struct SnapshotRecorder {
    dns: Arc<dyn DnsRecordSource>,
    probe: Arc<dyn ReachabilityProbe>,
    zones: Mutex<BTreeMap<String, Vec<Zone>>>,
    records: Mutex<BTreeMap<String, BTreeMap<String, Vec<RawRecord>>>>,
    unreachable: Mutex<BTreeSet<String>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SnapshotRecorder {
    pub fn new(
        dns: Arc<dyn DnsRecordSource>,
        probe: Arc<dyn ReachabilityProbe>,
    ) -> SnapshotRecorder {
        SnapshotRecorder {
            dns,
            probe,
            zones: Mutex::new(BTreeMap::new()),
            records: Mutex::new(BTreeMap::new()),
            unreachable: Mutex::new(BTreeSet::new()),
        }
    }

    /// Copy everything recorded so far into `snapshot`.
    pub fn record_into(&self, snapshot: &mut ForestSnapshot) {
        snapshot.zones.extend(locked(&self.zones).clone());
        for (dc, zones) in locked(&self.records).iter() {
            snapshot
                .records
                .entry(dc.clone())
                .or_default()
                .extend(zones.clone());
        }
        snapshot.unreachable.extend(locked(&self.unreachable).iter().cloned());
    }
}

impl DnsRecordSource for SnapshotRecorder {
    fn list_zones(&self, dc: &DomainController) -> Result<Vec<Zone>, SourceError> {
        let zones = self.dns.list_zones(dc)?;
        locked(&self.zones).insert(dc.name.clone(), zones.clone());
        Ok(zones)
    }

    fn list_records(
        &self,
        dc: &DomainController,
        zone: &Zone,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let records = self.dns.list_records(dc, zone)?;
        locked(&self.records)
            .entry(dc.name.clone())
            .or_default()
            .insert(zone.name.clone(), records.clone());
        Ok(records)
    }
}

impl ReachabilityProbe for SnapshotRecorder {
    fn is_reachable(&self, host: &str) -> bool {
        let reachable = self.probe.is_reachable(host);
        if !reachable {
            locked(&self.unreachable).insert(host.to_string());
        }
        reachable
    }
}

impl DirectoryService for ForestSnapshot {
    fn list_sites(&self) -> Result<Vec<RawSite>, SourceError> {
        Ok(self.sites.clone())
    }

    fn list_subnets(&self) -> Result<Vec<RawSubnet>, SourceError> {
        Ok(self.subnets.clone())
    }

    fn list_domain_controllers(&self) -> Result<Vec<DomainController>, SourceError> {
        Ok(self.domain_controllers.clone())
    }
}

impl DnsRecordSource for ForestSnapshot {
    fn list_zones(&self, dc: &DomainController) -> Result<Vec<Zone>, SourceError> {
        self.zones
            .get(&dc.name)
            .cloned()
            .ok_or_else(|| format!("no zone data for {}", dc.name).into())
    }

    fn list_records(
        &self,
        dc: &DomainController,
        zone: &Zone,
    ) -> Result<Vec<RawRecord>, SourceError> {
        self.records
            .get(&dc.name)
            .and_then(|zones| zones.get(&zone.name))
            .cloned()
            .ok_or_else(|| format!("no record data for zone {} on {}", zone.name, dc.name).into())
    }
}

impl ReachabilityProbe for ForestSnapshot {
    fn is_reachable(&self, host: &str) -> bool {
        !self
            .unreachable
            .iter()
            .any(|h| h.eq_ignore_ascii_case(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SNAPSHOT: &str = "src/tests/test_data/forest_snapshot_01.json";

    #[test]
    fn test_load_snapshot() {
        let snapshot = ForestSnapshot::load(TEST_SNAPSHOT).expect("Error reading snapshot");
        assert_eq!(snapshot.sites.len(), 3);
        assert_eq!(snapshot.domain_controllers.len(), 4);
        assert_eq!(snapshot.domain_controllers[0].name, "DC1");
        assert!(!snapshot.is_reachable("10.0.2.10"));
        assert!(snapshot.is_reachable("10.0.0.10"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ForestSnapshot::load("src/tests/test_data/does_not_exist.json").is_err());
    }

    #[test]
    fn test_parse_error_reports_path() {
        let err = ForestSnapshot::from_json(r#"{"subnets":[{"cidr":5}]}"#).unwrap_err();
        assert!(err.to_string().contains("subnets[0].cidr"), "{err}");
    }

    #[test]
    fn test_missing_zone_data_is_error() {
        let snapshot = ForestSnapshot::default();
        let dc = DomainController::new("DCX", "10.9.9.9", "X");
        assert!(snapshot.list_zones(&dc).is_err());
        let zone = Zone {
            name: "corp.example.com".to_string(),
            ..Default::default()
        };
        assert!(snapshot.list_records(&dc, &zone).is_err());
    }

    #[test]
    fn test_recorder_keeps_successful_answers() {
        let source =
            Arc::new(ForestSnapshot::load(TEST_SNAPSHOT).expect("Error reading snapshot"));
        let recorder = SnapshotRecorder::new(source.clone(), source.clone());
        let mut captured =
            ForestSnapshot::capture_directory(source.as_ref()).expect("capture failed");

        for dc in &source.domain_controllers {
            if !recorder.is_reachable(dc.host()) {
                continue;
            }
            let Ok(zones) = recorder.list_zones(dc) else {
                continue;
            };
            for zone in &zones {
                let _ = recorder.list_records(dc, zone);
            }
        }
        recorder.record_into(&mut captured);

        assert_eq!(captured.subnets, source.subnets);
        assert_eq!(captured.zones.get("DC1"), source.zones.get("DC1"));
        // DC3 is unreachable, DC4 has no zone data
        assert!(!captured.zones.contains_key("DC3"));
        assert!(!captured.zones.contains_key("DC4"));
        assert!(captured.unreachable.contains("10.0.2.10"));
        // the zone without record data stays absent
        let dc1 = captured.records.get("DC1").expect("DC1 records");
        assert!(dc1.contains_key("zone.com"));
        assert!(!dc1.contains_key("broken.zone.com"));
    }
}
