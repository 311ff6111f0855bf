//! Domain controller, zone and DNS record models.

use super::parse_addr;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// A domain controller running the DNS server role.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DomainController {
    /// Host name, e.g. "DC1.corp.example.com".
    pub name: String,
    /// Primary IPv4 address as reported by the directory.
    #[serde(default)]
    pub ipv4: String,
    /// AD site the DC belongs to, empty when the directory has none.
    #[serde(default)]
    pub site: String,
}

impl DomainController {
    pub fn new(name: &str, ipv4: &str, site: &str) -> DomainController {
        DomainController {
            name: name.to_string(),
            ipv4: ipv4.to_string(),
            site: site.to_string(),
        }
    }

    /// Address used to reach the DC: its IPv4 when known, else its name.
    pub fn host(&self) -> &str {
        if self.ipv4.is_empty() {
            &self.name
        } else {
            &self.ipv4
        }
    }
}

/// A DNS zone hosted on a DC.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub is_reverse_lookup: bool,
    /// "Primary", "Secondary", "Stub", "Forwarder".
    #[serde(default)]
    pub zone_type: String,
}

/// Record exactly as the record source hands it over.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub hostname: String,
    #[serde(rename = "type")]
    pub record_type: String,
    /// Seconds; 0 marks a static record.
    #[serde(default)]
    pub ttl: u32,
    /// Record payload in presentation format.
    #[serde(default)]
    pub data: String,
}

impl RawRecord {
    pub fn new(hostname: &str, record_type: &str, ttl: u32, data: &str) -> RawRecord {
        RawRecord {
            hostname: hostname.to_string(),
            record_type: record_type.to_string(),
            ttl,
            data: data.to_string(),
        }
    }
}

/// Typed record payload, one variant per record type.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname {
        alias: String,
    },
    Mx {
        preference: u16,
        exchange: String,
    },
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    Ns {
        host: String,
    },
    Ptr {
        host: String,
    },
    Txt {
        text: String,
    },
    Soa {
        primary_server: String,
        responsible: String,
        serial: u32,
    },
    /// Unknown record types plus known types whose payload did not parse.
    Other {
        record_type: String,
        data: String,
    },
}

impl RecordData {
    /// Decode a presentation-format payload for `record_type`.
    pub fn parse(record_type: &str, data: &str) -> RecordData {
        let data = data.trim();
        let fields: Vec<&str> = data.split_whitespace().collect();
        let parsed = match record_type.to_ascii_uppercase().as_str() {
            "A" => parse_addr(data).ok().map(RecordData::A),
            "AAAA" => data.parse().ok().map(RecordData::Aaaa),
            "CNAME" if !data.is_empty() => Some(RecordData::Cname {
                alias: data.to_string(),
            }),
            "MX" => match fields.as_slice() {
                [preference, exchange] => preference.parse().ok().map(|preference| {
                    RecordData::Mx {
                        preference,
                        exchange: exchange.to_string(),
                    }
                }),
                _ => None,
            },
            "SRV" => match fields.as_slice() {
                [priority, weight, port, target] => {
                    match (priority.parse(), weight.parse(), port.parse()) {
                        (Ok(priority), Ok(weight), Ok(port)) => Some(RecordData::Srv {
                            priority,
                            weight,
                            port,
                            target: target.to_string(),
                        }),
                        _ => None,
                    }
                }
                _ => None,
            },
            "NS" if !data.is_empty() => Some(RecordData::Ns {
                host: data.to_string(),
            }),
            "PTR" if !data.is_empty() => Some(RecordData::Ptr {
                host: data.to_string(),
            }),
            "TXT" => Some(RecordData::Txt {
                text: data.trim_matches('"').to_string(),
            }),
            "SOA" => match fields.as_slice() {
                [primary, responsible, serial, ..] => {
                    serial.parse().ok().map(|serial| RecordData::Soa {
                        primary_server: primary.to_string(),
                        responsible: responsible.to_string(),
                        serial,
                    })
                }
                _ => None,
            },
            _ => None,
        };
        parsed.unwrap_or_else(|| RecordData::Other {
            record_type: record_type.to_ascii_uppercase(),
            data: data.to_string(),
        })
    }

    /// Record type mnemonic, e.g. "A" or "SRV".
    pub fn record_type(&self) -> &str {
        match self {
            RecordData::A(_) => "A",
            RecordData::Aaaa(_) => "AAAA",
            RecordData::Cname { .. } => "CNAME",
            RecordData::Mx { .. } => "MX",
            RecordData::Srv { .. } => "SRV",
            RecordData::Ns { .. } => "NS",
            RecordData::Ptr { .. } => "PTR",
            RecordData::Txt { .. } => "TXT",
            RecordData::Soa { .. } => "SOA",
            RecordData::Other { record_type, .. } => record_type,
        }
    }
}

/// A resource record read from one zone on one DC.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DnsRecord {
    pub hostname: String,
    pub zone: String,
    pub ttl: u32,
    pub data: RecordData,
    pub source_dc: String,
}

impl DnsRecord {
    pub fn from_raw(raw: &RawRecord, zone: &str, source_dc: &str) -> DnsRecord {
        DnsRecord {
            hostname: raw.hostname.clone(),
            zone: zone.to_string(),
            ttl: raw.ttl,
            data: RecordData::parse(&raw.record_type, &raw.data),
            source_dc: source_dc.to_string(),
        }
    }

    /// Static records carry TTL 0 by convention.
    pub fn is_static(&self) -> bool {
        self.ttl == 0
    }

    /// Fully qualified name of the record within its zone.
    pub fn fqdn(&self) -> String {
        let host = self.hostname.trim_end_matches('.');
        let zone = self.zone.trim_end_matches('.');
        let host_lower = host.to_ascii_lowercase();
        let zone_lower = zone.to_ascii_lowercase();
        if host.is_empty() || host == "@" {
            zone.to_string()
        } else if host_lower == zone_lower || host_lower.ends_with(&format!(".{zone_lower}")) {
            host.to_string()
        } else {
            format!("{host}.{zone}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(
            RecordData::parse("A", "10.0.1.5"),
            RecordData::A(Ipv4Addr::new(10, 0, 1, 5))
        );
        assert_eq!(
            RecordData::parse("mx", "10 mail.corp.example.com"),
            RecordData::Mx {
                preference: 10,
                exchange: "mail.corp.example.com".to_string()
            }
        );
        assert_eq!(
            RecordData::parse("SRV", "0 100 389 dc1.corp.example.com"),
            RecordData::Srv {
                priority: 0,
                weight: 100,
                port: 389,
                target: "dc1.corp.example.com".to_string()
            }
        );
        assert_eq!(
            RecordData::parse("AAAA", "fe80::1").record_type(),
            "AAAA"
        );
    }

    #[test]
    fn test_parse_a_accepts_leading_zeros() {
        // same octet rules as the classifier
        assert_eq!(
            RecordData::parse("A", "10.0.1.05"),
            RecordData::A(Ipv4Addr::new(10, 0, 1, 5))
        );
        assert_eq!(
            RecordData::parse("A", " 010.000.001.005 "),
            RecordData::A(Ipv4Addr::new(10, 0, 1, 5))
        );
    }

    #[test]
    fn test_parse_malformed_degrades_to_other() {
        assert_eq!(
            RecordData::parse("A", "10.0.1"),
            RecordData::Other {
                record_type: "A".to_string(),
                data: "10.0.1".to_string()
            }
        );
        assert_eq!(RecordData::parse("MX", "mail").record_type(), "MX");
        assert!(matches!(
            RecordData::parse("HINFO", "x86 windows"),
            RecordData::Other { .. }
        ));
    }

    #[test]
    fn test_fqdn() {
        let raw = RawRecord::new("host", "A", 0, "10.0.1.5");
        let record = DnsRecord::from_raw(&raw, "zone.com", "DC1");
        assert_eq!(record.fqdn(), "host.zone.com");
        assert!(record.is_static());

        let apex = DnsRecord::from_raw(
            &RawRecord::new("@", "A", 3600, "10.0.0.1"),
            "zone.com",
            "DC1",
        );
        assert_eq!(apex.fqdn(), "zone.com");
        assert!(!apex.is_static());

        let qualified = DnsRecord::from_raw(
            &RawRecord::new("web.Zone.com.", "A", 0, "10.0.0.2"),
            "zone.com",
            "DC1",
        );
        assert_eq!(qualified.fqdn(), "web.Zone.com");
    }

    #[test]
    fn test_raw_record_json_shape() {
        let raw: RawRecord =
            serde_json::from_str(r#"{"hostname":"www","type":"A","ttl":0,"data":"10.0.0.5"}"#)
                .unwrap();
        assert_eq!(raw, RawRecord::new("www", "A", 0, "10.0.0.5"));
    }

    #[test]
    fn test_dc_host() {
        assert_eq!(DomainController::new("DC1", "10.0.0.10", "A").host(), "10.0.0.10");
        assert_eq!(DomainController::new("DC1", "", "A").host(), "DC1");
    }
}
