use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{Family, ObjectId};

/// A single assigned address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddress {
    pub id: ObjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: IpAddr,
    /// Length of the network the address sits in, when the backend knows it.
    pub prefix_length: Option<u8>,
    pub custom_fields: Map<String, Value>,
    pub vrf_id: Option<ObjectId>,
    pub nat_inside_id: Option<ObjectId>,
    pub nat_outside_id: Option<ObjectId>,
    pub status: Option<String>,
    pub tenant: Option<ObjectId>,
}

impl IpAddress {
    pub fn family(&self) -> Family {
        Family::of(&self.address)
    }

    /// `address/len`, falling back to a host route when the length is unknown.
    pub fn with_prefix_length(&self) -> String {
        let len = self
            .prefix_length
            .unwrap_or_else(|| self.family().host_prefix_len());
        format!("{}/{len}", self.address)
    }
}
