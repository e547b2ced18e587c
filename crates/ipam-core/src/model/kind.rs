// ── Entity kinds ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The seven entity kinds the migrator knows about.
///
/// `Ord` follows migration order, so a `BTreeMap<EntityKind, _>` iterates
/// in the order the engine writes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EntityKind {
    Role,
    VlanGroup,
    Vlan,
    Vrf,
    Prefix,
    IpAddress,
    Aggregate,
}

impl EntityKind {
    /// Dependency order for writes: referenced kinds come first.
    pub const MIGRATION_ORDER: [Self; 7] = [
        Self::Role,
        Self::VlanGroup,
        Self::Vlan,
        Self::Vrf,
        Self::Prefix,
        Self::IpAddress,
        Self::Aggregate,
    ];

    /// Plural label for summaries ("Wrote 3 VLANs.").
    pub fn plural(self) -> &'static str {
        match self {
            Self::Role => "roles",
            Self::VlanGroup => "VLAN groups",
            Self::Vlan => "VLANs",
            Self::Vrf => "VRFs",
            Self::Prefix => "prefixes",
            Self::IpAddress => "IP addresses",
            Self::Aggregate => "aggregates",
        }
    }

    /// Plural, kebab-case name used on the command line (`--skip vlan-groups`).
    pub fn cli_name(self) -> &'static str {
        match self {
            Self::Role => "roles",
            Self::VlanGroup => "vlan-groups",
            Self::Vlan => "vlans",
            Self::Vrf => "vrfs",
            Self::Prefix => "prefixes",
            Self::IpAddress => "ip-addresses",
            Self::Aggregate => "aggregates",
        }
    }
}
