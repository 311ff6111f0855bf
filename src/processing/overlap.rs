//! Overlapping subnet detection.
//!
//! Classification takes the first containing subnet in table order, so an
//! address inside two overlapping subnets resolves by key order rather than
//! by the more specific prefix. These pairs are reported before an audit.

use super::SubnetTable;
use crate::models::Subnet;

/// Two subnets where one covers the other.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapConflict {
    /// Entry classification will pick for addresses in both.
    pub winner: Subnet,
    /// Entry shadowed by `winner` for those addresses.
    pub shadowed: Subnet,
}

impl OverlapConflict {
    /// True when the shadowed entry is the more specific one and assigns a
    /// different site, i.e. longest-prefix-match would decide otherwise.
    pub fn changes_site(&self) -> bool {
        self.shadowed.cidr.mask > self.winner.cidr.mask
            && !self.shadowed.site.eq_ignore_ascii_case(&self.winner.site)
    }
}

/// Find every pair of subnets in `table` where one covers the other.
pub fn find_overlapping_subnets(table: &SubnetTable) -> Vec<OverlapConflict> {
    let subnets: Vec<&Subnet> = table.iter().collect();
    let mut conflicts = Vec::new();

    // table order: i comes first and wins
    for (i, first) in subnets.iter().enumerate() {
        for second in subnets.iter().skip(i + 1) {
            if first.cidr.covers(&second.cidr) || second.cidr.covers(&first.cidr) {
                conflicts.push(OverlapConflict {
                    winner: (*first).clone(),
                    shadowed: (*second).clone(),
                });
            }
        }
    }
    conflicts
}

/// Log overlapping subnet conflicts as warnings.
pub fn log_overlapping_subnets(conflicts: &[OverlapConflict]) {
    if conflicts.is_empty() {
        log::info!("No overlapping subnets found.");
        return;
    }

    log::warn!(
        "Found {} overlapping subnet pair(s); first match in key order wins:",
        conflicts.len()
    );
    for conflict in conflicts {
        log::warn!(
            "  {} ({}) shadows {} ({}){}",
            conflict.winner.key,
            conflict.winner.site,
            conflict.shadowed.key,
            conflict.shadowed.site,
            if conflict.changes_site() {
                " - longest-prefix-match would pick a different site"
            } else {
                ""
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawSubnet;
    use crate::processing::build_subnet_table;

    #[test]
    fn test_find_overlapping_subnets() {
        let table = build_subnet_table(&[
            RawSubnet::new("10.0.0.0/8", "Wide"),
            RawSubnet::new("10.1.0.0/16", "Narrow"),
            RawSubnet::new("192.168.0.0/24", "Other"),
        ]);
        let conflicts = find_overlapping_subnets(&table);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].winner.key, "10.0.0.0/8");
        assert_eq!(conflicts[0].shadowed.key, "10.1.0.0/16");
        assert!(conflicts[0].changes_site());
    }

    #[test]
    fn test_same_network_different_spelling() {
        let table = build_subnet_table(&[
            RawSubnet::new("192.168.1.0/24", "A"),
            RawSubnet::new("192.168.1.5/24", "A"),
        ]);
        let conflicts = find_overlapping_subnets(&table);
        assert_eq!(conflicts.len(), 1);
        assert!(!conflicts[0].changes_site());
    }

    #[test]
    fn test_no_overlap() {
        let table = build_subnet_table(&[
            RawSubnet::new("10.0.0.0/24", "A"),
            RawSubnet::new("10.0.1.0/24", "B"),
        ]);
        assert!(find_overlapping_subnets(&table).is_empty());
    }
}
