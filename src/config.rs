//! Command line and audit configuration.

use crate::processing::DetectOptions;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound of DCs processed at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;
/// Per-DC budget for zone and record collection.
pub const DEFAULT_DC_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PROBE_TIMEOUT_MSEC: u64 = 2000;
pub const DNS_PORT: u16 = 53;
pub const DEFAULT_EXPORT_PATH: &str = "./reports";
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Replay a JSON forest snapshot.
    Snapshot,
    /// Query AD and the DNS servers through PowerShell.
    Powershell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProbeKind {
    /// TCP connect to port 53.
    Tcp,
    /// Single ICMP echo.
    Ping,
}

/// Find DNS A records whose address belongs to another AD site than the DC hosting them.
#[derive(Parser, Debug, Clone)]
#[command(name = "ad-dns-site-audit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only audit this zone (repeatable)
    #[arg(short = 'z', long = "zone")]
    pub zones: Vec<String>,

    /// Also audit dynamically registered records (TTL > 0)
    #[arg(long, env = "AUDIT_INCLUDE_DYNAMIC")]
    pub include_dynamic: bool,

    /// Report addresses that fall in no configured subnet
    #[arg(long, env = "AUDIT_INCLUDE_UNKNOWN_SUBNETS")]
    pub include_unknown_subnets: bool,

    /// Directory the reports are written to
    #[arg(short = 'o', long, env = "AUDIT_EXPORT_PATH", default_value = DEFAULT_EXPORT_PATH)]
    pub export_path: PathBuf,

    /// Where the forest inventory comes from
    #[arg(long, value_enum, env = "AUDIT_SOURCE", default_value = "powershell")]
    pub source: SourceKind,

    /// Snapshot file read with --source snapshot
    #[arg(long, env = "AUDIT_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Write the collected inventory to this snapshot file
    #[arg(long, env = "AUDIT_SAVE_SNAPSHOT")]
    pub save_snapshot: Option<PathBuf>,

    /// PowerShell executable
    #[arg(long, env = "AUDIT_POWERSHELL", default_value = "powershell")]
    pub powershell: String,

    /// Reachability check run before each DC
    #[arg(long, value_enum, env = "AUDIT_PROBE", default_value = "tcp")]
    pub probe: ProbeKind,

    #[arg(long, env = "AUDIT_PROBE_TIMEOUT_MS", default_value_t = DEFAULT_PROBE_TIMEOUT_MSEC)]
    pub probe_timeout_ms: u64,

    /// DCs processed concurrently
    #[arg(long, env = "AUDIT_MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Seconds before a DC is marked failed
    #[arg(long, env = "AUDIT_DC_TIMEOUT_SECS", default_value_t = DEFAULT_DC_TIMEOUT_SECS)]
    pub dc_timeout_secs: u64,

    /// log4rs configuration file
    #[arg(long, env = "AUDIT_LOG_CONFIG", default_value = DEFAULT_LOG_CONFIG)]
    pub log_config: PathBuf,
}

/// Settings passed into the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    pub zones: Vec<String>,
    pub include_dynamic: bool,
    pub include_unknown_subnets: bool,
    pub export_path: PathBuf,
    pub max_concurrency: usize,
    pub dc_timeout: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            zones: Vec::new(),
            include_dynamic: false,
            include_unknown_subnets: false,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            dc_timeout: Duration::from_secs(DEFAULT_DC_TIMEOUT_SECS),
        }
    }
}

impl AuditConfig {
    pub fn detect_options(&self) -> DetectOptions {
        DetectOptions {
            include_dynamic: self.include_dynamic,
            zones: self.zones.clone(),
        }
    }
}

impl From<&Cli> for AuditConfig {
    fn from(cli: &Cli) -> Self {
        AuditConfig {
            zones: cli.zones.clone(),
            include_dynamic: cli.include_dynamic,
            include_unknown_subnets: cli.include_unknown_subnets,
            export_path: cli.export_path.clone(),
            max_concurrency: cli.max_concurrency.max(1),
            dc_timeout: Duration::from_secs(cli.dc_timeout_secs),
        }
    }
}
