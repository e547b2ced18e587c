use serde::{Deserialize, Serialize};

use super::id::{ObjectId, Vid};

/// An 802.1Q VLAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vlan {
    pub id: ObjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub vid: Vid,
    pub vlan_group: Option<ObjectId>,
    pub tenant: Option<ObjectId>,
    pub site: Option<ObjectId>,
    pub status: Option<String>,
}

/// A named set of VLANs (NetBox `ipam.vlangroup`, phpIPAM L2 domain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanGroup {
    pub id: ObjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: String,
    pub site: Option<ObjectId>,
}

impl Vlan {
    /// Name to send to destinations that require one.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("VLAN {}", self.vid))
    }
}
