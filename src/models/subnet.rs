//! AD subnet and site data models.

use super::Ipv4;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Subnet as returned by the directory service, before parsing.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawSubnet {
    /// CIDR string, e.g. "10.0.1.0/24".
    pub cidr: String,
    /// Name of the site the subnet is assigned to.
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RawSubnet {
    pub fn new(cidr: &str, site: &str) -> RawSubnet {
        RawSubnet {
            cidr: cidr.to_string(),
            site: site.to_string(),
            ..Default::default()
        }
    }
}

/// A parsed subnet entry of the [`crate::processing::SubnetTable`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subnet {
    /// The CIDR string exactly as supplied; the table key.
    pub key: String,
    /// Parsed network, possibly non-canonical.
    pub cidr: Ipv4,
    /// Owning site name.
    pub site: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// An AD site as returned by the directory service.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawSite {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An AD site with the subnet keys assigned to it.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub subnets: BTreeSet<String>,
}

impl From<&RawSite> for Site {
    fn from(raw: &RawSite) -> Self {
        Site {
            name: raw.name.clone(),
            location: raw.location.clone(),
            description: raw.description.clone(),
            subnets: BTreeSet::new(),
        }
    }
}
