use ad_dns_site_audit::config::{AuditConfig, Cli, ProbeKind, SourceKind, DNS_PORT};
use ad_dns_site_audit::logging::init_logging;
use ad_dns_site_audit::output::{export_reports, print_summary, run_stamp};
use ad_dns_site_audit::processing::summarize_by_site;
use ad_dns_site_audit::source::{
    DirectoryService, DnsRecordSource, ForestSnapshot, PingProbe, PowerShellSource,
    ReachabilityProbe, SnapshotRecorder, SourceError, TcpProbe,
};
use ad_dns_site_audit::{audit_forest, block_on, AuditError};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_config) {
        eprintln!("Error initializing logging: {e}");
        return ExitCode::FAILURE;
    }
    log::info!("#Start main()");

    match block_on(run(cli)) {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("Error starting runtime: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Snapshot being captured by this run, written once the audit is done.
struct PendingSave {
    path: PathBuf,
    snapshot: ForestSnapshot,
    recorder: Arc<SnapshotRecorder>,
}

async fn run(cli: Cli) -> Result<(), SourceError> {
    let config = AuditConfig::from(&cli);
    let probe_timeout = Duration::from_millis(cli.probe_timeout_ms);
    let live_probe: Arc<dyn ReachabilityProbe> = match cli.probe {
        ProbeKind::Tcp => Arc::new(TcpProbe::new(DNS_PORT, probe_timeout)),
        ProbeKind::Ping => Arc::new(PingProbe {
            timeout: probe_timeout,
        }),
    };

    let mut pending_save = None;
    let (directory, dns, probe): (
        Arc<dyn DirectoryService>,
        Arc<dyn DnsRecordSource>,
        Arc<dyn ReachabilityProbe>,
    ) = match cli.source {
        SourceKind::Snapshot => {
            let path = cli
                .snapshot
                .as_ref()
                .ok_or("--snapshot is required with --source snapshot")?;
            let snapshot = Arc::new(ForestSnapshot::load(&path.to_string_lossy())?);
            (
                snapshot.clone() as Arc<dyn DirectoryService>,
                snapshot.clone() as Arc<dyn DnsRecordSource>,
                snapshot as Arc<dyn ReachabilityProbe>,
            )
        }
        SourceKind::Powershell => {
            let live = Arc::new(PowerShellSource {
                program: cli.powershell.clone(),
                timeout: config.dc_timeout,
            });
            match &cli.save_snapshot {
                Some(path) => {
                    // DC data is recorded while the audit's worker pool queries it
                    let snapshot = ForestSnapshot::capture_directory(live.as_ref())
                        .map_err(|e| AuditError::DirectoryUnavailable(e.to_string()))?;
                    let recorder = Arc::new(SnapshotRecorder::new(live, live_probe));
                    let directory = Arc::new(snapshot.clone());
                    pending_save = Some(PendingSave {
                        path: path.clone(),
                        snapshot,
                        recorder: recorder.clone(),
                    });
                    (
                        directory as Arc<dyn DirectoryService>,
                        recorder.clone() as Arc<dyn DnsRecordSource>,
                        recorder as Arc<dyn ReachabilityProbe>,
                    )
                }
                None => (
                    live.clone() as Arc<dyn DirectoryService>,
                    live as Arc<dyn DnsRecordSource>,
                    live_probe,
                ),
            }
        }
    };

    let (forest, outcome) = audit_forest(directory.as_ref(), dns, probe, config.clone()).await?;

    if let Some(mut pending) = pending_save {
        pending.recorder.record_into(&mut pending.snapshot);
        pending.snapshot.save(&pending.path.to_string_lossy())?;
    }

    let by_site = summarize_by_site(&outcome.records);
    print_summary(&outcome, &by_site);

    let stamp = run_stamp(chrono::Local::now());
    let files = export_reports(&config.export_path, &stamp, &outcome, &forest.sites)
        .map_err(|e| AuditError::Report(e.to_string()))?;
    for file in files {
        log::info!("Report: {}", file.display());
    }
    Ok(())
}
