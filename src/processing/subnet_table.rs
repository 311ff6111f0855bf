//! Subnet table construction.
//!
//! Turns the directory's subnet list into the lookup table used by the
//! classifier. Malformed entries are logged and skipped.

use crate::models::{Ipv4, ParseError, RawSubnet, Subnet};
use std::collections::BTreeMap;

/// Subnets keyed by their CIDR string as supplied.
///
/// Iteration is in lexical key order, which fixes the first-match order
/// used by [`crate::processing::classify_addr`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubnetTable {
    subnets: BTreeMap<String, Subnet>,
}

impl SubnetTable {
    pub fn new() -> SubnetTable {
        SubnetTable {
            subnets: BTreeMap::new(),
        }
    }

    /// Insert a subnet, returning the entry it replaced.
    pub fn insert(&mut self, subnet: Subnet) -> Option<Subnet> {
        self.subnets.insert(subnet.key.clone(), subnet)
    }

    pub fn get(&self, key: &str) -> Option<&Subnet> {
        self.subnets.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subnet> {
        self.subnets.values()
    }

    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }
}

/// Parse a single directory subnet entry.
///
/// The key keeps the original string; a non-canonical network address is
/// accepted as is.
pub fn parse_subnet(raw: &RawSubnet) -> Result<Subnet, ParseError> {
    let cidr = Ipv4::new(&raw.cidr)?;
    Ok(Subnet {
        key: raw.cidr.clone(),
        cidr,
        site: raw.site.clone(),
        location: raw.location.clone(),
        description: raw.description.clone(),
    })
}

/// Build the subnet table from the directory's subnet list.
pub fn build_subnet_table(raw_subnets: &[RawSubnet]) -> SubnetTable {
    let mut table = SubnetTable::new();
    let mut skipped = 0;

    for raw in raw_subnets {
        let subnet = match parse_subnet(raw) {
            Ok(subnet) => subnet,
            Err(e) => {
                log::warn!("Skipping subnet '{}' (site '{}'): {e}", raw.cidr, raw.site);
                skipped += 1;
                continue;
            }
        };
        if !subnet.cidr.is_canonical() {
            log::warn!(
                "Subnet '{}' is not canonical, matching as {}/{}",
                subnet.key,
                subnet.cidr.lo(),
                subnet.cidr.mask
            );
        }
        if let Some(previous) = table.insert(subnet) {
            log::warn!(
                "Duplicate subnet '{}': site '{}' replaced by '{}'",
                previous.key,
                previous.site,
                raw.site
            );
        }
    }

    log::info!(
        "Built subnet table with {} entries ({} skipped)",
        table.len(),
        skipped
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_skips_malformed() {
        let raw = vec![
            RawSubnet::new("10.0.0.0/24", "SiteA"),
            RawSubnet::new("10.0.1.0", "SiteB"),
            RawSubnet::new("10.0.2.0/40", "SiteC"),
            RawSubnet::new("10.0.999.0/24", "SiteD"),
            RawSubnet::new("10.0.3.0/24", "SiteE"),
        ];
        let table = build_subnet_table(&raw);
        assert_eq!(table.len(), 2);
        assert!(table.get("10.0.0.0/24").is_some());
        assert!(table.get("10.0.3.0/24").is_some());
    }

    #[test]
    fn test_duplicate_last_write_wins() {
        let raw = vec![
            RawSubnet::new("10.0.0.0/24", "SiteA"),
            RawSubnet::new("10.0.0.0/24", "SiteB"),
        ];
        let table = build_subnet_table(&raw);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("10.0.0.0/24").unwrap().site, "SiteB");
    }

    #[test]
    fn test_key_kept_verbatim() {
        let raw = vec![RawSubnet::new("192.168.1.5/24", "Branch")];
        let table = build_subnet_table(&raw);
        let subnet = table.get("192.168.1.5/24").expect("key should be verbatim");
        assert_eq!(subnet.cidr.mask, 24);
        assert!(table.get("192.168.1.0/24").is_none());
    }

    #[test]
    fn test_parse_subnet_errors() {
        assert!(matches!(
            parse_subnet(&RawSubnet::new("10.0.0/24", "A")),
            Err(ParseError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_subnet(&RawSubnet::new("10.0.0.0/33", "A")),
            Err(ParseError::InvalidPrefix(_))
        ));
        assert!(matches!(
            parse_subnet(&RawSubnet::new("garbage", "A")),
            Err(ParseError::MissingPrefix(_))
        ));
    }

    #[test]
    fn test_iteration_in_key_order() {
        let raw = vec![
            RawSubnet::new("10.1.0.0/16", "B"),
            RawSubnet::new("10.0.0.0/8", "A"),
        ];
        let table = build_subnet_table(&raw);
        let keys: Vec<&str> = table.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["10.0.0.0/8", "10.1.0.0/16"]);
    }
}
