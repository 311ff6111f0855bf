//! Site mismatch detection for the records hosted on one DC.

use super::{classify_addr, Classification, SubnetTable};
use crate::models::{DnsRecord, DomainController, MismatchRecord, MismatchType, RecordData, Zone};
use crate::source::{DnsRecordSource, SourceError};
use chrono::Local;
use std::net::Ipv4Addr;

/// Site label used for addresses outside every configured subnet.
pub const UNMATCHED_SITE: &str = "Unmatched";

/// Record selection options for the detector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectOptions {
    /// Also consider records with a non-zero TTL.
    pub include_dynamic: bool,
    /// Only process these zones; empty means all forward zones.
    pub zones: Vec<String>,
}

/// Mismatches found on one DC together with zone bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct DcCollection {
    pub records: Vec<MismatchRecord>,
    pub zones_processed: usize,
    pub zones_failed: usize,
}

/// Loopback and link-local addresses are never classified.
pub fn is_excluded_address(addr: Ipv4Addr) -> bool {
    addr.is_loopback() || addr.is_link_local()
}

/// Reverse zones are skipped; a non-empty filter limits the forward zones.
pub fn zone_selected(zone: &Zone, filter: &[String]) -> bool {
    !zone.is_reverse_lookup
        && (filter.is_empty() || filter.iter().any(|z| z.eq_ignore_ascii_case(&zone.name)))
}

/// Classify each A record and emit a [`MismatchRecord`] when its site is not
/// the DC's site.
///
/// Addresses in no subnet come out as [`MismatchType::UnmatchedSubnet`]; the
/// orchestrator drops those unless unknown subnets were requested.
pub fn detect_mismatches(
    dc: &DomainController,
    records: &[DnsRecord],
    table: &SubnetTable,
    opts: &DetectOptions,
) -> Vec<MismatchRecord> {
    let timestamp = Local::now();
    let mut found = Vec::new();

    for record in records {
        let addr = match record.data {
            RecordData::A(addr) => addr,
            _ => continue,
        };
        if is_excluded_address(addr) {
            log::trace!("skip {} -> {addr} (loopback/link-local)", record.hostname);
            continue;
        }
        if !opts.include_dynamic && !record.is_static() {
            continue;
        }

        let (ip_site, ip_subnet, ip_location, mismatch_type) = match classify_addr(addr, table) {
            Classification::Site {
                name,
                subnet_key,
                location,
            } => {
                if name.eq_ignore_ascii_case(&dc.site) {
                    continue;
                }
                (
                    name,
                    subnet_key,
                    location.unwrap_or_default(),
                    MismatchType::DifferentSite,
                )
            }
            Classification::Unmatched => (
                UNMATCHED_SITE.to_string(),
                String::new(),
                String::new(),
                MismatchType::UnmatchedSubnet,
            ),
            Classification::Invalid => continue,
        };

        found.push(MismatchRecord {
            dc_name: dc.name.clone(),
            dc_site: dc.site.clone(),
            dc_ip: dc.ipv4.clone(),
            zone: record.zone.clone(),
            record_name: record.hostname.clone(),
            fqdn: record.fqdn(),
            record_type: record.data.record_type().to_string(),
            ip_address: addr.to_string(),
            ip_site,
            ip_subnet,
            ip_location,
            mismatch_type,
            ttl: record.ttl,
            is_static: record.is_static(),
            timestamp,
        });
    }
    found
}

/// Walk every selected zone on `dc` and collect its mismatches.
///
/// Failing to list zones fails the DC; failing to list one zone's records
/// skips that zone only.
pub fn collect_dc_mismatches(
    dc: &DomainController,
    source: &dyn DnsRecordSource,
    table: &SubnetTable,
    opts: &DetectOptions,
) -> Result<DcCollection, SourceError> {
    let zones = source
        .list_zones(dc)
        .map_err(|e| format!("zone enumeration failed: {e}"))?;
    let mut collection = DcCollection::default();

    for zone in zones.iter().filter(|z| zone_selected(z, &opts.zones)) {
        let raw_records = match source.list_records(dc, zone) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("{}: skipping zone '{}': {e}", dc.name, zone.name);
                collection.zones_failed += 1;
                continue;
            }
        };
        let records: Vec<DnsRecord> = raw_records
            .iter()
            .map(|raw| DnsRecord::from_raw(raw, &zone.name, &dc.name))
            .collect();
        let mismatches = detect_mismatches(dc, &records, table, opts);
        log::debug!(
            "{}: zone '{}' {} records, {} flagged",
            dc.name,
            zone.name,
            records.len(),
            mismatches.len()
        );
        collection.records.extend(mismatches);
        collection.zones_processed += 1;
    }
    Ok(collection)
}
