// ── API-to-domain type conversions ──
//
// Bridges raw `ipam_api` response types into `ipam_core::model` records.
// Every reference becomes a bare `ObjectId` (nested NetBox objects are
// flattened, phpIPAM's `0` becomes `None`). Records that cannot be
// represented, such as a CIDR with host bits or a VLAN number out of
// range, fail with `CoreError::InvalidRecord` and are skipped by the reader.

use serde_json::Value;

use ipam_api::netbox::models::{
    NbAggregate, NbIpAddress, NbPrefix, NbRole, NbVlan, NbVlanGroup, NbVrf, Reference,
};
use ipam_api::phpipam::models::{PiAddress, PiSubnet, PiVlan, PiVlanBody, PiVrf};

use crate::error::CoreError;
use crate::model::{
    Aggregate, Entity, EntityKind, IpAddress, ObjectId, Prefix, Role, Vid, Vlan, VlanGroup, Vrf,
    parse_host, parse_network,
};

/// phpIPAM's built-in default L2 domain.
pub const PHPIPAM_DEFAULT_DOMAIN: u64 = 1;

// ── Helpers ────────────────────────────────────────────────────────

fn reference(r: Option<&Reference>) -> Option<ObjectId> {
    r.map(|r| ObjectId::new(r.id()))
}

/// Empty strings mean "unset" on both backends.
fn text(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn invalid(kind: EntityKind, id: u64, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidRecord {
        kind,
        id: id.to_string(),
        reason: reason.into(),
    }
}

// ── NetBox ─────────────────────────────────────────────────────────

impl From<NbRole> for Role {
    fn from(r: NbRole) -> Self {
        Self {
            id: ObjectId::new(r.id),
            name: text(Some(r.name)),
            description: text(r.description),
            slug: r.slug,
            weight: r.weight,
        }
    }
}

impl From<NbVlanGroup> for VlanGroup {
    fn from(g: NbVlanGroup) -> Self {
        Self {
            id: ObjectId::new(g.id),
            name: text(Some(g.name)),
            description: text(g.description),
            slug: g.slug,
            site: reference(g.site.as_ref()),
        }
    }
}

impl TryFrom<NbVlan> for Vlan {
    type Error = CoreError;

    fn try_from(v: NbVlan) -> Result<Self, Self::Error> {
        let vid = Vid::new(v.vid).map_err(|e| invalid(EntityKind::Vlan, v.id, e))?;
        Ok(Self {
            id: ObjectId::new(v.id),
            name: text(Some(v.name)),
            description: text(v.description),
            vid,
            vlan_group: reference(v.group.as_ref()),
            tenant: reference(v.tenant.as_ref()),
            site: reference(v.site.as_ref()),
            status: v.status.and_then(|s| s.value()),
        })
    }
}

impl From<NbVrf> for Vrf {
    fn from(v: NbVrf) -> Self {
        Self {
            id: ObjectId::new(v.id),
            name: text(Some(v.name)),
            description: text(v.description),
            route_distinguisher: text(v.rd),
            enforce_unique: v.enforce_unique,
            tenant: reference(v.tenant.as_ref()),
        }
    }
}

impl TryFrom<NbPrefix> for Prefix {
    type Error = CoreError;

    fn try_from(p: NbPrefix) -> Result<Self, Self::Error> {
        let prefix = parse_network(&p.prefix).map_err(|e| invalid(EntityKind::Prefix, p.id, e))?;
        Ok(Self {
            id: ObjectId::new(p.id),
            name: None,
            description: text(p.description),
            prefix,
            is_pool: p.is_pool,
            vlan_id: reference(p.vlan.as_ref()),
            vrf_id: reference(p.vrf.as_ref()),
            role_id: reference(p.role.as_ref()),
            site: reference(p.site.as_ref()),
            tenant: reference(p.tenant.as_ref()),
            status: p.status.and_then(|s| s.value()),
        })
    }
}

impl TryFrom<NbAggregate> for Aggregate {
    type Error = CoreError;

    fn try_from(a: NbAggregate) -> Result<Self, Self::Error> {
        let prefix =
            parse_network(&a.prefix).map_err(|e| invalid(EntityKind::Aggregate, a.id, e))?;
        Ok(Self {
            id: ObjectId::new(a.id),
            name: None,
            description: text(a.description),
            prefix,
            rir: Some(ObjectId::new(a.rir.id())),
            custom_fields: a.custom_fields,
        })
    }
}

impl TryFrom<NbIpAddress> for IpAddress {
    type Error = CoreError;

    fn try_from(a: NbIpAddress) -> Result<Self, Self::Error> {
        let (address, prefix_length) =
            parse_host(&a.address).map_err(|e| invalid(EntityKind::IpAddress, a.id, e))?;
        Ok(Self {
            id: ObjectId::new(a.id),
            name: None,
            description: text(a.description),
            address,
            prefix_length,
            custom_fields: a.custom_fields,
            vrf_id: reference(a.vrf.as_ref()),
            nat_inside_id: reference(a.nat_inside.as_ref()),
            nat_outside_id: reference(a.nat_outside.as_ref()),
            status: a.status.and_then(|s| s.value()),
            tenant: reference(a.tenant.as_ref()),
        })
    }
}

/// Decode one NetBox JSON object of `kind` into an entity.
pub fn netbox_entity(kind: EntityKind, value: Value) -> Result<Entity, CoreError> {
    fn decode<T: serde::de::DeserializeOwned>(
        kind: EntityKind,
        value: Value,
    ) -> Result<T, CoreError> {
        let id = value
            .get("id")
            .map_or_else(|| "?".to_owned(), ToString::to_string);
        serde_json::from_value(value).map_err(|e| CoreError::InvalidRecord {
            kind,
            id,
            reason: e.to_string(),
        })
    }

    Ok(match kind {
        EntityKind::Role => Role::from(decode::<NbRole>(kind, value)?).into(),
        EntityKind::VlanGroup => VlanGroup::from(decode::<NbVlanGroup>(kind, value)?).into(),
        EntityKind::Vlan => Vlan::try_from(decode::<NbVlan>(kind, value)?)?.into(),
        EntityKind::Vrf => Vrf::from(decode::<NbVrf>(kind, value)?).into(),
        EntityKind::Prefix => Prefix::try_from(decode::<NbPrefix>(kind, value)?)?.into(),
        EntityKind::IpAddress => IpAddress::try_from(decode::<NbIpAddress>(kind, value)?)?.into(),
        EntityKind::Aggregate => Aggregate::try_from(decode::<NbAggregate>(kind, value)?)?.into(),
    })
}

// ── phpIPAM ────────────────────────────────────────────────────────

impl TryFrom<PiSubnet> for Prefix {
    type Error = CoreError;

    /// Folders and subnets without network data are rejected.
    fn try_from(s: PiSubnet) -> Result<Self, Self::Error> {
        let (Some(subnet), Some(mask)) = (text(s.subnet), s.mask) else {
            return Err(invalid(
                EntityKind::Prefix,
                s.id,
                format!(
                    "'{}' has no subnet data",
                    s.description.as_deref().unwrap_or_default()
                ),
            ));
        };
        let prefix = parse_network(&format!("{subnet}/{mask}"))
            .map_err(|e| invalid(EntityKind::Prefix, s.id, e))?;
        Ok(Self {
            id: ObjectId::new(s.id),
            name: None,
            description: text(s.description),
            prefix,
            is_pool: s.is_pool,
            vlan_id: ObjectId::non_zero(s.vlan_id),
            vrf_id: ObjectId::non_zero(s.vrf_id),
            role_id: None,
            site: None,
            tenant: None,
            status: None,
        })
    }
}

/// Convert an address found under a subnet with the given mask.
pub fn phpipam_address(
    a: PiAddress,
    prefix_length: Option<u8>,
    vrf_id: Option<ObjectId>,
) -> Result<IpAddress, CoreError> {
    let (address, own_length) =
        parse_host(&a.ip).map_err(|e| invalid(EntityKind::IpAddress, a.id, e))?;
    Ok(IpAddress {
        id: ObjectId::new(a.id),
        name: text(a.hostname),
        description: text(a.description),
        address,
        prefix_length: own_length.or(prefix_length),
        custom_fields: serde_json::Map::new(),
        vrf_id,
        nat_inside_id: None,
        nat_outside_id: None,
        status: a.tag.and_then(phpipam_tag_status),
        tenant: None,
    })
}

/// phpIPAM address tags, mapped onto NetBox-style status slugs.
fn phpipam_tag_status(tag: u64) -> Option<String> {
    let status = match tag {
        1 => "deprecated",
        2 => "active",
        3 => "reserved",
        4 => "dhcp",
        _ => return None,
    };
    Some(status.to_owned())
}

impl TryFrom<PiVlan> for Vlan {
    type Error = CoreError;

    fn try_from(v: PiVlan) -> Result<Self, Self::Error> {
        let vid = Vid::try_from(v.number).map_err(|e| invalid(EntityKind::Vlan, v.id, e))?;
        Ok(Self {
            id: ObjectId::new(v.id),
            name: text(v.name),
            description: text(v.description),
            vid,
            vlan_group: None,
            tenant: None,
            site: None,
            status: None,
        })
    }
}

impl From<PiVrf> for Vrf {
    fn from(v: PiVrf) -> Self {
        Self {
            id: ObjectId::new(v.id),
            name: text(Some(v.name)),
            description: text(v.description),
            route_distinguisher: text(v.rd),
            enforce_unique: true,
            tenant: None,
        }
    }
}

impl From<&Vlan> for PiVlanBody {
    fn from(v: &Vlan) -> Self {
        Self {
            id: None,
            number: v.vid.get(),
            name: Some(v.display_name()),
            description: v.description.clone(),
            domain_id: Some(PHPIPAM_DEFAULT_DOMAIN),
        }
    }
}
