//! Output of audit results.
//!
//! This module handles writing the audit reports:
//! - [`csv`] - CSV report files
//! - [`terminal`] - Terminal summary with colors
//!
//! All files of one run share a timestamp suffix and land in the export
//! directory.

mod csv;
mod terminal;

pub use self::csv::{
    write_count_summary, write_dc_summary, write_mismatch_report, write_site_inventory,
    DC_SUMMARY_COLUMNS, MISMATCH_COLUMNS,
};
pub use terminal::{format_field, print_summary, render_summary};

use crate::models::Site;
use crate::processing::{summarize_by_dc, summarize_by_site, AuditOutcome};
use chrono::{DateTime, Local};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Suffix shared by all report files of one run.
pub fn run_stamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Write every report of a run into `dir`, returning the files written.
pub fn export_reports(
    dir: &Path,
    stamp: &str,
    outcome: &AuditOutcome,
    sites: &[Site],
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Error creating export directory {}: {e}", dir.display()))?;

    let mismatch_csv = dir.join(format!("DNS_Site_Mismatches_{stamp}.csv"));
    write_mismatch_report(&mismatch_csv, &outcome.records)?;

    let mismatch_json = dir.join(format!("DNS_Site_Mismatches_{stamp}.json"));
    let json = serde_json::to_string_pretty(&outcome.records)
        .map_err(|e| format!("Error serializing mismatches: {e}"))?;
    std::fs::write(&mismatch_json, json)
        .map_err(|e| format!("Error writing {}: {e}", mismatch_json.display()))?;

    let dc_csv = dir.join(format!("DC_Processing_Summary_{stamp}.csv"));
    write_dc_summary(&dc_csv, &outcome.dc_stats)?;

    let site_csv = dir.join(format!("Site_Mismatch_Summary_{stamp}.csv"));
    write_count_summary(&site_csv, "SiteName", &summarize_by_site(&outcome.records))?;

    let by_dc_csv = dir.join(format!("DC_Mismatch_Summary_{stamp}.csv"));
    write_count_summary(&by_dc_csv, "DCName", &summarize_by_dc(&outcome.records))?;

    let inventory_csv = dir.join(format!("Site_Inventory_{stamp}.csv"));
    write_site_inventory(&inventory_csv, sites)?;

    Ok(vec![
        mismatch_csv,
        mismatch_json,
        dc_csv,
        site_csv,
        by_dc_csv,
        inventory_csv,
    ])
}
