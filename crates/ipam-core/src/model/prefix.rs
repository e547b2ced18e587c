use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{Family, ObjectId};

/// A routed network (phpIPAM subnet, NetBox prefix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
    pub id: ObjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub prefix: IpNet,
    pub is_pool: bool,
    pub vlan_id: Option<ObjectId>,
    pub vrf_id: Option<ObjectId>,
    pub role_id: Option<ObjectId>,
    pub site: Option<ObjectId>,
    pub tenant: Option<ObjectId>,
    pub status: Option<String>,
}

impl Prefix {
    pub fn family(&self) -> Family {
        Family::of_net(&self.prefix)
    }
}

/// A top-level block allocated by a RIR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub id: ObjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub prefix: IpNet,
    pub rir: Option<ObjectId>,
    pub custom_fields: Map<String, Value>,
}

impl Aggregate {
    pub fn family(&self) -> Family {
        Family::of_net(&self.prefix)
    }
}
