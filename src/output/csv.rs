//! CSV report files.

use crate::models::{CountRow, DcProcessingSummary, MismatchRecord, Site};
use serde::Serialize;
use std::error::Error;
use std::path::Path;

/// Columns of the mismatch report, as serialized from [`MismatchRecord`].
pub const MISMATCH_COLUMNS: [&str; 15] = [
    "DCName",
    "DCSite",
    "DCIP",
    "Zone",
    "RecordName",
    "FQDN",
    "RecordType",
    "IPAddress",
    "IPSite",
    "IPSubnet",
    "IPLocation",
    "MismatchType",
    "TTL",
    "IsStatic",
    "Timestamp",
];

/// Columns of the DC report, as serialized from [`DcProcessingSummary`].
pub const DC_SUMMARY_COLUMNS: [&str; 8] = [
    "DCName",
    "DCSite",
    "DCIP",
    "Status",
    "MismatchCount",
    "ZonesProcessed",
    "ZonesFailed",
    "DurationSeconds",
];

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, Box<dyn Error>> {
    let writer = csv::Writer::from_path(path)
        .map_err(|e| format!("Error creating {}: {e}", path.display()))?;
    Ok(writer)
}

/// Serialize `rows` with their serde header; an empty report still gets
/// `columns` as its header line.
fn write_rows<T: Serialize>(
    path: &Path,
    columns: &[&str],
    rows: &[T],
) -> Result<(), Box<dyn Error>> {
    let mut writer = open_writer(path)?;
    if rows.is_empty() {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    }
    writer.flush()?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_mismatch_report(
    path: &Path,
    records: &[MismatchRecord],
) -> Result<(), Box<dyn Error>> {
    write_rows(path, &MISMATCH_COLUMNS, records)
}

pub fn write_dc_summary(
    path: &Path,
    stats: &[DcProcessingSummary],
) -> Result<(), Box<dyn Error>> {
    write_rows(path, &DC_SUMMARY_COLUMNS, stats)
}

pub fn write_count_summary(
    path: &Path,
    name_column: &str,
    counts: &[CountRow],
) -> Result<(), Box<dyn Error>> {
    let mut writer = open_writer(path)?;
    writer.write_record([name_column, "MismatchCount"])?;
    for row in counts {
        writer.write_record([row.name.clone(), row.count.to_string()])?;
    }
    writer.flush()?;
    log::info!("Wrote {} rows to {}", counts.len(), path.display());
    Ok(())
}

pub fn write_site_inventory(path: &Path, sites: &[Site]) -> Result<(), Box<dyn Error>> {
    let mut writer = open_writer(path)?;
    writer.write_record(["SiteName", "Location", "Description", "SubnetCount", "Subnets"])?;
    for s in sites {
        writer.write_record([
            s.name.clone(),
            s.location.clone().unwrap_or_default(),
            s.description.clone().unwrap_or_default(),
            s.subnets.len().to_string(),
            s.subnets.iter().cloned().collect::<Vec<String>>().join(";"),
        ])?;
    }
    writer.flush()?;
    log::info!("Wrote {} rows to {}", sites.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DcStatus, MismatchType};

    fn record(location: &str) -> MismatchRecord {
        MismatchRecord {
            dc_name: "DC1".to_string(),
            dc_site: "SiteA".to_string(),
            dc_ip: "10.0.0.10".to_string(),
            zone: "zone.com".to_string(),
            record_name: "host".to_string(),
            fqdn: "host.zone.com".to_string(),
            record_type: "A".to_string(),
            ip_address: "10.0.1.5".to_string(),
            ip_site: "SiteB".to_string(),
            ip_subnet: "10.0.1.0/24".to_string(),
            ip_location: location.to_string(),
            mismatch_type: MismatchType::DifferentSite,
            ttl: 0,
            is_static: true,
            timestamp: chrono::Local::now(),
        }
    }

    fn header_of(path: &Path) -> String {
        let text = std::fs::read_to_string(path).unwrap();
        text.lines().next().unwrap_or_default().to_string()
    }

    #[test]
    fn test_mismatch_header_matches_columns() {
        let dir = tempfile::tempdir().unwrap();
        let with_rows = dir.path().join("rows.csv");
        let empty = dir.path().join("empty.csv");
        write_mismatch_report(&with_rows, &[record("London")]).unwrap();
        write_mismatch_report(&empty, &[]).unwrap();

        assert_eq!(header_of(&with_rows), MISMATCH_COLUMNS.join(","));
        assert_eq!(header_of(&empty), MISMATCH_COLUMNS.join(","));
    }

    #[test]
    fn test_dc_summary_header_matches_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dc.csv");
        let stats = vec![DcProcessingSummary {
            dc_name: "DC3".to_string(),
            dc_site: "SiteC".to_string(),
            dc_ip: "10.0.2.10".to_string(),
            status: DcStatus::Failed("unreachable".to_string()),
            mismatch_count: 0,
            zones_processed: 0,
            zones_failed: 0,
            duration_seconds: 0.5,
        }];
        write_dc_summary(&path, &stats).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(header_of(&path), DC_SUMMARY_COLUMNS.join(","));
        assert!(text.contains("DC3,SiteC,10.0.2.10,Failed: unreachable,0,0,0,0.5"));
    }

    #[test]
    fn test_fields_with_separators_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quoted.csv");
        write_mismatch_report(&path, &[record("New York, \"HQ\"")]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[10], "New York, \"HQ\"");
        assert_eq!(&row[11], "DifferentSite");
        assert_eq!(&row[13], "true");
    }

    #[test]
    fn test_count_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("by_site.csv");
        let counts = vec![
            CountRow {
                name: "SiteB".to_string(),
                count: 2,
            },
            CountRow {
                name: "New York, NY".to_string(),
                count: 1,
            },
        ];
        write_count_summary(&path, "SiteName", &counts).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "SiteName,MismatchCount\nSiteB,2\n\"New York, NY\",1\n"
        );
    }
}
