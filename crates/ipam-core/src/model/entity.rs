// ── Entity sum type ──
//
// One variant per kind. The engine and the destination contract move
// entities around as `Entity` so a single code path serves every kind.

use serde::{Deserialize, Serialize};

use super::id::ObjectId;
use super::ip_address::IpAddress;
use super::kind::EntityKind;
use super::prefix::{Aggregate, Prefix};
use super::role::Role;
use super::vlan::{Vlan, VlanGroup};
use super::vrf::Vrf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Entity {
    Role(Role),
    VlanGroup(VlanGroup),
    Vlan(Vlan),
    Vrf(Vrf),
    Prefix(Prefix),
    IpAddress(IpAddress),
    Aggregate(Aggregate),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Role(_) => EntityKind::Role,
            Self::VlanGroup(_) => EntityKind::VlanGroup,
            Self::Vlan(_) => EntityKind::Vlan,
            Self::Vrf(_) => EntityKind::Vrf,
            Self::Prefix(_) => EntityKind::Prefix,
            Self::IpAddress(_) => EntityKind::IpAddress,
            Self::Aggregate(_) => EntityKind::Aggregate,
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            Self::Role(e) => e.id,
            Self::VlanGroup(e) => e.id,
            Self::Vlan(e) => e.id,
            Self::Vrf(e) => e.id,
            Self::Prefix(e) => e.id,
            Self::IpAddress(e) => e.id,
            Self::Aggregate(e) => e.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Role(e) => e.name.as_deref(),
            Self::VlanGroup(e) => e.name.as_deref(),
            Self::Vlan(e) => e.name.as_deref(),
            Self::Vrf(e) => e.name.as_deref(),
            Self::Prefix(e) => e.name.as_deref(),
            Self::IpAddress(e) => e.name.as_deref(),
            Self::Aggregate(e) => e.name.as_deref(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Role(e) => e.description.as_deref(),
            Self::VlanGroup(e) => e.description.as_deref(),
            Self::Vlan(e) => e.description.as_deref(),
            Self::Vrf(e) => e.description.as_deref(),
            Self::Prefix(e) => e.description.as_deref(),
            Self::IpAddress(e) => e.description.as_deref(),
            Self::Aggregate(e) => e.description.as_deref(),
        }
    }
}

macro_rules! impl_from_record {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Entity {
                fn from(record: $variant) -> Self {
                    Self::$variant(record)
                }
            }
        )+
    };
}

impl_from_record!(Role, VlanGroup, Vlan, Vrf, Prefix, IpAddress, Aggregate);
