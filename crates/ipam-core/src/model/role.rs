use serde::{Deserialize, Serialize};

use super::id::ObjectId;

/// Prefix/VLAN function label (NetBox `ipam.role`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: ObjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: String,
    pub weight: i64,
}
