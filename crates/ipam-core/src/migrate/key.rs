// ── Natural keys ──
//
// The attribute a destination is searched by to find "the same" object.
// Backends may search loosely; `NaturalKey::matches` is the exact test.

use std::fmt;
use std::net::IpAddr;

use ipnet::IpNet;
use serde::Serialize;

use crate::model::{Entity, EntityKind, Vid};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "by", content = "value", rename_all = "kebab-case")]
pub enum NaturalKey {
    RoleSlug(String),
    VlanGroupSlug(String),
    Vid(Vid),
    /// VRFs with a route distinguisher are matched on it.
    VrfRd(String),
    /// VRFs without one fall back to their name.
    VrfName(String),
    Prefix(IpNet),
    IpAddress(IpAddr),
    Aggregate(IpNet),
}

impl NaturalKey {
    /// The key for `entity`, or `None` if it lacks the identifying field
    /// (a VRF with neither route distinguisher nor name).
    pub fn of(entity: &Entity) -> Option<Self> {
        Some(match entity {
            Entity::Role(r) => Self::RoleSlug(r.slug.clone()),
            Entity::VlanGroup(g) => Self::VlanGroupSlug(g.slug.clone()),
            Entity::Vlan(v) => Self::Vid(v.vid),
            Entity::Vrf(v) => match (non_blank(v.route_distinguisher.as_deref()), non_blank(v.name.as_deref())) {
                (Some(rd), _) => Self::VrfRd(rd.to_owned()),
                (None, Some(name)) => Self::VrfName(name.to_owned()),
                (None, None) => return None,
            },
            Entity::Prefix(p) => Self::Prefix(p.prefix),
            Entity::IpAddress(a) => Self::IpAddress(a.address),
            Entity::Aggregate(a) => Self::Aggregate(a.prefix),
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::RoleSlug(_) => EntityKind::Role,
            Self::VlanGroupSlug(_) => EntityKind::VlanGroup,
            Self::Vid(_) => EntityKind::Vlan,
            Self::VrfRd(_) | Self::VrfName(_) => EntityKind::Vrf,
            Self::Prefix(_) => EntityKind::Prefix,
            Self::IpAddress(_) => EntityKind::IpAddress,
            Self::Aggregate(_) => EntityKind::Aggregate,
        }
    }

    /// Exact natural-key equality against a destination record.
    pub fn matches(&self, entity: &Entity) -> bool {
        match (self, entity) {
            (Self::RoleSlug(slug), Entity::Role(r)) => &r.slug == slug,
            (Self::VlanGroupSlug(slug), Entity::VlanGroup(g)) => &g.slug == slug,
            (Self::Vid(vid), Entity::Vlan(v)) => &v.vid == vid,
            (Self::VrfRd(rd), Entity::Vrf(v)) => v.route_distinguisher.as_deref() == Some(rd.as_str()),
            (Self::VrfName(name), Entity::Vrf(v)) => {
                non_blank(v.route_distinguisher.as_deref()).is_none()
                    && v.name.as_deref() == Some(name.as_str())
            }
            (Self::Prefix(net), Entity::Prefix(p)) => &p.prefix == net,
            (Self::IpAddress(addr), Entity::IpAddress(a)) => &a.address == addr,
            (Self::Aggregate(net), Entity::Aggregate(a)) => &a.prefix == net,
            _ => false,
        }
    }

    /// `(parameter, value)` for a search query.
    pub fn query(&self) -> (&'static str, String) {
        match self {
            Self::RoleSlug(slug) | Self::VlanGroupSlug(slug) => ("slug", slug.clone()),
            Self::Vid(vid) => ("vid", vid.to_string()),
            Self::VrfRd(rd) => ("rd", rd.clone()),
            Self::VrfName(name) => ("name", name.clone()),
            Self::Prefix(net) | Self::Aggregate(net) => ("prefix", net.to_string()),
            Self::IpAddress(addr) => ("address", addr.to_string()),
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (param, value) = self.query();
        write!(f, "{param}={value}")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ObjectId, Vrf};

    fn vrf(rd: Option<&str>, name: Option<&str>) -> Entity {
        Entity::Vrf(Vrf {
            id: ObjectId::new(1),
            name: name.map(str::to_owned),
            description: None,
            route_distinguisher: rd.map(str::to_owned),
            enforce_unique: true,
            tenant: None,
        })
    }

    #[test]
    fn vrf_prefers_route_distinguisher() {
        let key = NaturalKey::of(&vrf(Some("65000:1"), Some("blue"))).unwrap();
        assert_eq!(key, NaturalKey::VrfRd("65000:1".into()));
        assert_eq!(key.to_string(), "rd=65000:1");
    }

    #[test]
    fn vrf_without_rd_uses_name() {
        let key = NaturalKey::of(&vrf(None, Some("blue"))).unwrap();
        assert_eq!(key, NaturalKey::VrfName("blue".into()));
        assert!(key.matches(&vrf(Some(""), Some("blue"))));
        assert!(!key.matches(&vrf(Some("65000:9"), Some("blue"))));
    }

    #[test]
    fn vrf_without_rd_or_name_has_no_key() {
        assert!(NaturalKey::of(&vrf(Some("  "), None)).is_none());
    }

    #[test]
    fn key_never_matches_other_kind() {
        let key = NaturalKey::RoleSlug("blue".into());
        assert!(!key.matches(&vrf(None, Some("blue"))));
    }
}
