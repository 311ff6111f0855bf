//! Fan-out of mismatch detection across all DCs.

use super::{classify_ip, collect_dc_mismatches, Classification, DetectOptions, SubnetTable};
use crate::config::AuditConfig;
use crate::models::{
    CountRow, DcProcessingSummary, DcStatus, DomainController, MismatchRecord, MismatchType,
};
use crate::source::{DnsRecordSource, ReachabilityProbe, SourceError};
use futures::StreamExt;
use itertools::Itertools;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything one audit run produced.
#[derive(Debug, Clone, Default)]
pub struct AuditOutcome {
    pub records: Vec<MismatchRecord>,
    /// Sorted by DC name.
    pub dc_stats: Vec<DcProcessingSummary>,
}

impl AuditOutcome {
    pub fn failed_dc_count(&self) -> usize {
        self.dc_stats.iter().filter(|s| s.status.is_failed()).count()
    }
}

/// Give DCs without a directory site the site their own address classifies to.
pub fn resolve_dc_sites(dcs: Vec<DomainController>, table: &SubnetTable) -> Vec<DomainController> {
    dcs.into_iter()
        .map(|mut dc| {
            if dc.site.trim().is_empty() {
                match classify_ip(&dc.ipv4, table) {
                    Classification::Site { name, subnet_key, .. } => {
                        log::warn!(
                            "{} has no site in the directory, using '{name}' from {subnet_key}",
                            dc.name
                        );
                        dc.site = name;
                    }
                    _ => log::warn!("{} has no site and {} matches no subnet", dc.name, dc.ipv4),
                }
            }
            dc
        })
        .collect()
}

/// Run detection for every DC, at most `config.max_concurrency` at a time.
///
/// A DC that is unreachable, fails zone enumeration or exceeds
/// `config.dc_timeout` is recorded as failed; the others are unaffected.
pub async fn run_audit(
    dcs: Vec<DomainController>,
    table: Arc<SubnetTable>,
    source: Arc<dyn DnsRecordSource>,
    probe: Arc<dyn ReachabilityProbe>,
    config: AuditConfig,
) -> AuditOutcome {
    let opts = config.detect_options();
    let max_concurrency = config.max_concurrency.max(1);
    log::info!(
        "Auditing {} DCs against {} subnets (concurrency {max_concurrency})",
        dcs.len(),
        table.len()
    );

    let results: Vec<(DcProcessingSummary, Vec<MismatchRecord>)> =
        futures::stream::iter(dcs.into_iter().map(|dc| {
            process_dc(
                dc,
                Arc::clone(&table),
                Arc::clone(&source),
                Arc::clone(&probe),
                opts.clone(),
                config.include_unknown_subnets,
                config.dc_timeout,
            )
        }))
        .buffer_unordered(max_concurrency)
        .collect()
        .await;

    let mut outcome = AuditOutcome::default();
    for (summary, records) in results {
        outcome.records.extend(records);
        outcome.dc_stats.push(summary);
    }
    outcome.dc_stats.sort_by(|a, b| a.dc_name.cmp(&b.dc_name));

    log::info!(
        "Audit finished: {} mismatches, {} of {} DCs failed",
        outcome.records.len(),
        outcome.failed_dc_count(),
        outcome.dc_stats.len()
    );
    outcome
}

async fn process_dc(
    dc: DomainController,
    table: Arc<SubnetTable>,
    source: Arc<dyn DnsRecordSource>,
    probe: Arc<dyn ReachabilityProbe>,
    opts: DetectOptions,
    include_unknown_subnets: bool,
    timeout: Duration,
) -> (DcProcessingSummary, Vec<MismatchRecord>) {
    let started = Instant::now();
    let task_dc = dc.clone();
    let job = tokio::task::spawn_blocking(move || {
        if !probe.is_reachable(task_dc.host()) {
            return Err(SourceError::from("unreachable"));
        }
        collect_dc_mismatches(&task_dc, source.as_ref(), &table, &opts)
    });

    let result = match tokio::time::timeout(timeout, job).await {
        Ok(Ok(Ok(collection))) => Ok(collection),
        Ok(Ok(Err(e))) => Err(e.to_string()),
        Ok(Err(e)) => Err(format!("worker failed: {e}")),
        Err(_) => Err(format!("timed out after {}s", timeout.as_secs_f64())),
    };

    let mut summary = DcProcessingSummary {
        dc_name: dc.name.clone(),
        dc_site: dc.site.clone(),
        dc_ip: dc.ipv4.clone(),
        status: DcStatus::Completed,
        mismatch_count: 0,
        zones_processed: 0,
        zones_failed: 0,
        duration_seconds: 0.0,
    };
    let records = match result {
        Ok(mut collection) => {
            summary.zones_processed = collection.zones_processed;
            summary.zones_failed = collection.zones_failed;
            if !include_unknown_subnets {
                collection
                    .records
                    .retain(|r| r.mismatch_type != MismatchType::UnmatchedSubnet);
            }
            collection.records
        }
        Err(reason) => {
            log::warn!("{}: {reason}", dc.name);
            summary.status = DcStatus::Failed(reason);
            Vec::new()
        }
    };
    summary.mismatch_count = records.len();
    summary.duration_seconds = started.elapsed().as_secs_f64();
    log::info!(
        "{}: {} in {:.2}s, {} records flagged",
        dc.name,
        summary.status,
        summary.duration_seconds,
        summary.mismatch_count
    );
    (summary, records)
}

/// Count descending, ties by name ascending.
fn sorted_counts<'a>(names: impl Iterator<Item = &'a str>) -> Vec<CountRow> {
    names
        .counts()
        .into_iter()
        .map(|(name, count)| CountRow {
            name: name.to_string(),
            count,
        })
        .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)))
        .collect()
}

/// Mismatches per classified site.
pub fn summarize_by_site(records: &[MismatchRecord]) -> Vec<CountRow> {
    sorted_counts(records.iter().map(|r| r.ip_site.as_str()))
}

/// Mismatches per hosting DC.
pub fn summarize_by_dc(records: &[MismatchRecord]) -> Vec<CountRow> {
    sorted_counts(records.iter().map(|r| r.dc_name.as_str()))
}
