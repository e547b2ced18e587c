// ── NetBox adapter ──
//
// Reads every `ipam` collection the model covers and writes all of them
// except aggregates, whose RIR is not migrated.

use serde_json::{Value, json};
use tracing::{debug, warn};

use ipam_api::netbox::{NetBoxClient, Resource};

use super::{Backend, Destination};
use crate::convert::netbox_entity;
use crate::error::CoreError;
use crate::migrate::NaturalKey;
use crate::model::{Entity, EntityKind, ObjectId};
use crate::snapshot::{ReadOptions, Snapshot};

pub struct NetBoxBackend {
    name: String,
    client: NetBoxClient,
}

fn resource(kind: EntityKind) -> Resource {
    match kind {
        EntityKind::Role => Resource::Roles,
        EntityKind::VlanGroup => Resource::VlanGroups,
        EntityKind::Vlan => Resource::Vlans,
        EntityKind::Vrf => Resource::Vrfs,
        EntityKind::Prefix => Resource::Prefixes,
        EntityKind::IpAddress => Resource::IpAddresses,
        EntityKind::Aggregate => Resource::Aggregates,
    }
}

impl NetBoxBackend {
    pub fn new(name: impl Into<String>, client: NetBoxClient) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    /// List a collection and convert it, skipping records that cannot be
    /// represented.
    async fn list_entities(
        &self,
        kind: EntityKind,
        filters: &[(&str, String)],
    ) -> Result<Vec<Entity>, CoreError> {
        let raw: Vec<Value> = self.client.list(resource(kind), filters).await?;
        Ok(raw
            .into_iter()
            .filter_map(|value| match netbox_entity(kind, value) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!("{e}, skipping");
                    None
                }
            })
            .collect())
    }

    fn ensure_writable(&self, kind: EntityKind) -> Result<(), CoreError> {
        if kind == EntityKind::Aggregate {
            return Err(CoreError::UnsupportedEntity {
                backend: self.name.clone(),
                kind,
            });
        }
        Ok(())
    }
}

/// The JSON body NetBox expects for `payload`.
///
/// References are sent as bare ids; a null reference is sent as `null` so
/// an update clears it.
fn write_body(payload: &Entity) -> Value {
    let description = payload.description().unwrap_or_default();
    match payload {
        Entity::Role(r) => json!({
            "name": r.name.clone().unwrap_or_else(|| r.slug.clone()),
            "slug": r.slug,
            "weight": r.weight,
            "description": description,
        }),
        Entity::VlanGroup(g) => json!({
            "name": g.name.clone().unwrap_or_else(|| g.slug.clone()),
            "slug": g.slug,
            "description": description,
        }),
        Entity::Vlan(v) => json!({
            "vid": v.vid,
            "name": v.display_name(),
            "description": description,
            "group": v.vlan_group,
        }),
        Entity::Vrf(v) => json!({
            "name": v.name.clone().or_else(|| v.route_distinguisher.clone()),
            "rd": v.route_distinguisher,
            "enforce_unique": v.enforce_unique,
            "description": description,
        }),
        Entity::Prefix(p) => json!({
            "prefix": p.prefix.to_string(),
            "is_pool": p.is_pool,
            "description": description,
            "vlan": p.vlan_id,
            "vrf": p.vrf_id,
            "role": p.role_id,
        }),
        Entity::IpAddress(a) => {
            let mut body = json!({
                "address": a.with_prefix_length(),
                "description": description,
                "vrf": a.vrf_id,
            });
            if !a.custom_fields.is_empty() {
                body["custom_fields"] = Value::Object(a.custom_fields.clone());
            }
            body
        }
        Entity::Aggregate(a) => json!({
            "prefix": a.prefix.to_string(),
            "description": description,
            "custom_fields": a.custom_fields,
        }),
    }
}

impl Destination for NetBoxBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, key: &NaturalKey) -> Result<Vec<Entity>, CoreError> {
        let kind = key.kind();
        self.ensure_writable(kind)?;
        let (param, value) = key.query();
        debug!("searching {} for {kind} {key}", self.name);

        let candidates = self.list_entities(kind, &[(param, value)]).await?;
        Ok(candidates.into_iter().filter(|e| key.matches(e)).collect())
    }

    async fn create(&self, payload: &Entity) -> Result<Entity, CoreError> {
        let kind = payload.kind();
        self.ensure_writable(kind)?;
        let created: Value = self
            .client
            .create(resource(kind), &write_body(payload))
            .await?;
        netbox_entity(kind, created)
    }

    async fn update(&self, id: ObjectId, payload: &Entity) -> Result<Entity, CoreError> {
        let kind = payload.kind();
        self.ensure_writable(kind)?;
        let updated: Value = self
            .client
            .update(resource(kind), id.get(), &write_body(payload))
            .await?;
        netbox_entity(kind, updated)
    }
}

impl Backend for NetBoxBackend {
    async fn read(&self, options: ReadOptions) -> Result<Snapshot, CoreError> {
        let mut builder = Snapshot::builder(self.name.clone(), options);

        for kind in EntityKind::MIGRATION_ORDER {
            if !options.reads(kind) {
                continue;
            }
            debug!("reading {} from {}", kind.plural(), self.name);
            let entities = self
                .list_entities(kind, &[])
                .await
                .map_err(|e| e.while_reading(&self.name, kind.plural()))?;
            builder.extend(entities);
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{IpAddress, Vid, Vlan};
    use pretty_assertions::assert_eq;

    #[test]
    fn null_vrf_is_sent_as_null() {
        let ip = Entity::IpAddress(IpAddress {
            id: ObjectId::new(1),
            name: None,
            description: None,
            address: "10.0.0.5".parse().unwrap(),
            prefix_length: Some(24),
            custom_fields: serde_json::Map::new(),
            vrf_id: None,
            nat_inside_id: None,
            nat_outside_id: None,
            status: None,
            tenant: None,
        });
        let body = write_body(&ip);
        assert_eq!(body["vrf"], Value::Null);
        assert_eq!(body["address"], json!("10.0.0.5/24"));
        assert!(body.get("custom_fields").is_none());
    }

    #[test]
    fn vlan_body_carries_group_id() {
        let vlan = Entity::Vlan(Vlan {
            id: ObjectId::new(1),
            name: Some("servers".into()),
            description: Some("rack 4".into()),
            vid: Vid::new(100).unwrap(),
            vlan_group: Some(ObjectId::new(7)),
            tenant: None,
            site: None,
            status: None,
        });
        assert_eq!(
            write_body(&vlan),
            json!({ "vid": 100, "name": "servers", "description": "rack 4", "group": 7 })
        );
    }
}
