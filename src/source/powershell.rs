//! Live inventory through the ActiveDirectory and DnsServer PowerShell modules.
//!
//! Each query projects the cmdlet output onto the flat shapes in
//! [`crate::models`] and converts it with `ConvertTo-Json`.

use super::cli;
use super::{DirectoryService, DnsRecordSource, SourceError};
use crate::config::DEFAULT_DC_TIMEOUT_SECS;
use crate::models::{DomainController, RawRecord, RawSite, RawSubnet, Zone};
use serde::de::DeserializeOwned;
use std::time::Duration;

const SITE_QUERY: &str = r#"Get-ADReplicationSite -Filter * |
    Select-Object @{n='name';e={$_.Name}},
                  @{n='location';e={$_.Location}},
                  @{n='description';e={$_.Description}}"#;

const SUBNET_QUERY: &str = r#"Get-ADReplicationSubnet -Filter * |
    Select-Object @{n='cidr';e={$_.Name}},
                  @{n='site';e={if ($_.Site) { (($_.Site -split ',')[0]) -replace '^CN=','' } else { '' }}},
                  @{n='location';e={$_.Location}},
                  @{n='description';e={$_.Description}}"#;

/// DCs of every domain in the forest. A DC is dropped only when CIM answers
/// and reports no DNS service; unreachable DCs stay so the audit records them.
const DC_QUERY: &str = r#"(Get-ADForest).Domains |
    ForEach-Object { Get-ADDomainController -Filter * -Server $_ } |
    Where-Object {
        $dns = Get-CimInstance -ClassName Win32_Service -Filter "Name='DNS'" `
            -ComputerName $_.HostName -OperationTimeoutSec 15 `
            -ErrorAction SilentlyContinue -ErrorVariable cimError
        $dns -or $cimError
    } |
    Select-Object @{n='name';e={$_.HostName}},
                  @{n='ipv4';e={[string]$_.IPv4Address}},
                  @{n='site';e={[string]$_.Site}}"#;

/// `{dc}` is substituted before the query runs.
const ZONE_QUERY: &str = r#"Get-DnsServerZone -ComputerName '{dc}' |
    Select-Object @{n='name';e={$_.ZoneName}},
                  @{n='is_reverse_lookup';e={[bool]$_.IsReverseLookupZone}},
                  @{n='zone_type';e={[string]$_.ZoneType}}"#;

/// Records without an aging timestamp are static and reported with TTL 0.
/// `{dc}` and `{zone}` are substituted before the query runs.
const RECORD_QUERY: &str = r#"Get-DnsServerResourceRecord -ComputerName '{dc}' -ZoneName '{zone}' |
    Select-Object @{n='hostname';e={$_.HostName}},
                  @{n='type';e={[string]$_.RecordType}},
                  @{n='ttl';e={if ($_.Timestamp) { [int]$_.TimeToLive.TotalSeconds } else { 0 }}},
                  @{n='data';e={
                      $d = $_.RecordData
                      switch ($_.RecordType) {
                          'A'     { $d.IPv4Address.IPAddressToString }
                          'AAAA'  { $d.IPv6Address.IPAddressToString }
                          'CNAME' { $d.HostNameAlias }
                          'MX'    { '{0} {1}' -f $d.Preference, $d.MailExchange }
                          'SRV'   { '{0} {1} {2} {3}' -f $d.Priority, $d.Weight, $d.Port, $d.DomainName }
                          'NS'    { $d.NameServer }
                          'PTR'   { $d.PtrDomainName }
                          'TXT'   { $d.DescriptiveText }
                          'SOA'   { '{0} {1} {2}' -f $d.PrimaryServer, $d.ResponsiblePerson, $d.SerialNumber }
                          default { '' }
                      }
                  }}"#;

/// Runs inventory queries on the local host with `powershell`.
#[derive(Debug, Clone)]
pub struct PowerShellSource {
    /// Executable, "powershell" or "pwsh".
    pub program: String,
    /// Upper bound for a single query; the process is killed after it.
    pub timeout: Duration,
}

impl Default for PowerShellSource {
    fn default() -> Self {
        PowerShellSource {
            program: "powershell".to_string(),
            timeout: Duration::from_secs(DEFAULT_DC_TIMEOUT_SECS),
        }
    }
}

impl PowerShellSource {
    fn query<T: DeserializeOwned>(&self, script: &str) -> Result<Vec<T>, SourceError> {
        let script = format!("@({script}) | ConvertTo-Json -Depth 4 -Compress");
        let output = cli::run_args(
            &self.program,
            &["-NoProfile", "-NonInteractive", "-Command", &script],
            self.timeout,
        )?;
        parse_json_list(&output)
    }
}

/// Escape a value for use inside a single-quoted PowerShell string.
fn ps_quote(value: &str) -> String {
    value.replace('\'', "''")
}

/// Parse `ConvertTo-Json` output, which is empty for no results and a bare
/// object for exactly one.
pub fn parse_json_list<T: DeserializeOwned>(output: &str) -> Result<Vec<T>, SourceError> {
    let output = output.trim();
    if output.is_empty() {
        return Ok(Vec::new());
    }
    let json = if output.starts_with('{') {
        format!("[{output}]")
    } else {
        output.to_string()
    };
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let parsed: Vec<T> = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", output);
        format!("Error parsing JSON: path={} error={}", e.path(), e)
    })?;
    Ok(parsed)
}

impl DirectoryService for PowerShellSource {
    fn list_sites(&self) -> Result<Vec<RawSite>, SourceError> {
        self.query(SITE_QUERY)
    }

    fn list_subnets(&self) -> Result<Vec<RawSubnet>, SourceError> {
        self.query(SUBNET_QUERY)
    }

    fn list_domain_controllers(&self) -> Result<Vec<DomainController>, SourceError> {
        self.query(DC_QUERY)
    }
}

impl DnsRecordSource for PowerShellSource {
    fn list_zones(&self, dc: &DomainController) -> Result<Vec<Zone>, SourceError> {
        self.query(&ZONE_QUERY.replace("{dc}", &ps_quote(&dc.name)))
    }

    fn list_records(
        &self,
        dc: &DomainController,
        zone: &Zone,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let script = RECORD_QUERY
            .replace("{dc}", &ps_quote(&dc.name))
            .replace("{zone}", &ps_quote(&zone.name));
        self.query(&script)
    }
}
