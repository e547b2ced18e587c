// NetBox API response types
//
// Models for the NetBox `ipam` REST endpoints. Only the fields the migrator
// reads are modeled explicitly; the API returns many more, and newer
// releases keep adding them, so every struct tolerates unknown keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Pagination envelope ──────────────────────────────────────────────

/// Standard NetBox list envelope:
/// ```json
/// { "count": 2, "next": "https://…?offset=1000", "previous": null, "results": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

// ── References ───────────────────────────────────────────────────────

/// A foreign key as NetBox serializes it.
///
/// Read responses nest the referenced object (`{"vrf": {"id": 7, ...}}`);
/// some write responses and older releases return the bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Id(u64),
    Nested(NestedObject),
}

impl Reference {
    pub fn id(&self) -> u64 {
        match self {
            Self::Id(id) => *id,
            Self::Nested(obj) => obj.id,
        }
    }
}

/// Brief representation of a related object. Only `id` is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedObject {
    pub id: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Choice field. NetBox 2.x used integer values, later releases use slugs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    Labeled { value: Value },
    Bare(Value),
}

impl Choice {
    /// The choice value rendered as a string (`"active"`, `"1"`).
    pub fn value(&self) -> Option<String> {
        let raw = match self {
            Self::Labeled { value } | Self::Bare(value) => value,
        };
        match raw {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ── Resources ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbRole {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbVlanGroup {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub site: Option<Reference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbVlan {
    pub id: u64,
    pub vid: u16,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Option<Reference>,
    #[serde(default)]
    pub site: Option<Reference>,
    #[serde(default)]
    pub tenant: Option<Reference>,
    #[serde(default)]
    pub status: Option<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbVrf {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub rd: Option<String>,
    #[serde(default)]
    pub enforce_unique: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tenant: Option<Reference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbPrefix {
    pub id: u64,
    pub prefix: String,
    #[serde(default)]
    pub is_pool: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vlan: Option<Reference>,
    #[serde(default)]
    pub vrf: Option<Reference>,
    #[serde(default)]
    pub role: Option<Reference>,
    #[serde(default)]
    pub site: Option<Reference>,
    #[serde(default)]
    pub tenant: Option<Reference>,
    #[serde(default)]
    pub status: Option<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbAggregate {
    pub id: u64,
    pub prefix: String,
    pub rir: Reference,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbIpAddress {
    pub id: u64,
    /// Host address with prefix length, e.g. `10.0.0.1/24`.
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
    #[serde(default)]
    pub vrf: Option<Reference>,
    #[serde(default)]
    pub tenant: Option<Reference>,
    #[serde(default)]
    pub nat_inside: Option<Reference>,
    #[serde(default)]
    pub nat_outside: Option<Reference>,
    #[serde(default)]
    pub status: Option<Choice>,
}
