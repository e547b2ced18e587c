use serde::{Deserialize, Serialize};

use super::id::ObjectId;

/// A routing table instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vrf {
    pub id: ObjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Route distinguisher (`65000:1`), unset for VRFs that are purely local.
    pub route_distinguisher: Option<String>,
    pub enforce_unique: bool,
    pub tenant: Option<ObjectId>,
}
