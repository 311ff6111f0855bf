//! Site inventory: which subnets each AD site owns.

use super::SubnetTable;
use crate::models::{RawSite, Site};
use std::collections::BTreeMap;

/// Attach subnet keys to their sites, sorted by site name.
///
/// Subnets naming a site the directory does not list get a placeholder
/// site so they still show up in the inventory.
pub fn build_site_inventory(raw_sites: &[RawSite], table: &SubnetTable) -> Vec<Site> {
    let mut sites: BTreeMap<String, Site> = raw_sites
        .iter()
        .map(|raw| (raw.name.to_ascii_lowercase(), Site::from(raw)))
        .collect();

    for subnet in table.iter() {
        let key = subnet.site.to_ascii_lowercase();
        let site = sites.entry(key).or_insert_with(|| {
            log::warn!(
                "Subnet {} refers to site '{}' which is not in the directory",
                subnet.key,
                subnet.site
            );
            Site {
                name: subnet.site.clone(),
                ..Default::default()
            }
        });
        site.subnets.insert(subnet.key.clone());
    }

    for site in sites.values().filter(|s| s.subnets.is_empty()) {
        log::warn!("Site '{}' has no subnets assigned", site.name);
    }
    sites.into_values().collect()
}
