// ── Migration engine ──
//
// Writes a snapshot into a destination one kind at a time, in dependency
// order. Each entity is searched for by natural key and updated in place
// if found, created otherwise; the destination id is recorded so later
// kinds can rewrite their references to it.

use tracing::{debug, error, info, warn};

use super::id_map::{IdMaps, Resolution};
use super::key::NaturalKey;
use super::report::{KindReport, Mode, SkippedItem, WriteReport};
use crate::backend::Destination;
use crate::error::CoreError;
use crate::model::{
    Aggregate, Entity, EntityKind, IpAddress, ObjectId, Prefix, Vlan, VlanGroup, Vrf,
};
use crate::snapshot::Snapshot;

/// What happened to one source entity.
#[derive(Debug)]
enum Outcome {
    Created(Entity),
    Updated(Entity),
    WouldCreate,
    WouldUpdate(ObjectId),
}

pub struct Engine<'d, D: Destination + ?Sized> {
    destination: &'d D,
    mode: Mode,
    maps: IdMaps,
}

impl<'d, D: Destination + ?Sized> Engine<'d, D> {
    pub fn new(destination: &'d D, mode: Mode) -> Self {
        Self {
            destination,
            mode,
            maps: IdMaps::new(),
        }
    }

    /// Run every pass and return the report.
    ///
    /// Per-entity failures are recorded in the report. Only errors that
    /// make further requests pointless (connection loss, rejected
    /// credentials) end the run early.
    pub async fn run(mut self, snapshot: &Snapshot) -> Result<WriteReport, CoreError> {
        let mut report = WriteReport::new(self.destination.name(), self.mode);

        for kind in EntityKind::MIGRATION_ORDER {
            let entities = snapshot.entities(kind);
            if entities.is_empty() {
                continue;
            }
            self.run_pass(kind, entities, report.kind_mut(kind)).await?;
        }

        for (kind, kind_report) in &mut report.kinds {
            kind_report.id_map = self.maps.table(*kind);
        }
        Ok(report)
    }

    async fn run_pass(
        &mut self,
        kind: EntityKind,
        entities: Vec<Entity>,
        report: &mut KindReport,
    ) -> Result<(), CoreError> {
        match self.mode {
            Mode::Apply => info!("Writing {}...", kind.plural()),
            Mode::Plan => info!("Planning {}...", kind.plural()),
        }

        for entity in entities {
            let source_id = entity.id();
            let Some(key) = NaturalKey::of(&entity) else {
                let err = CoreError::InvalidRecord {
                    kind,
                    id: source_id.to_string(),
                    reason: "no natural key (route distinguisher or name)".into(),
                };
                warn!("{err}, skipping");
                report.skipped.push(skipped(kind, source_id, None, &err));
                continue;
            };

            match self.upsert(&entity, &key).await {
                Ok(Outcome::Created(dest)) => {
                    debug!("created {kind} {key} as {}", dest.id());
                    report.created += 1;
                    report.written.insert(dest.id(), dest);
                }
                Ok(Outcome::Updated(dest)) => {
                    debug!("updated {kind} {key} ({})", dest.id());
                    report.updated += 1;
                    report.written.insert(dest.id(), dest);
                }
                Ok(Outcome::WouldCreate) => {
                    debug!("would create {kind} {key}");
                    report.created += 1;
                }
                Ok(Outcome::WouldUpdate(id)) => {
                    debug!("would update {kind} {key} ({id})");
                    report.updated += 1;
                }
                Err(CoreError::UnsupportedEntity { backend, .. }) => {
                    warn!("{backend} cannot write {}, skipping them", kind.plural());
                    self.maps.mark_unsupported(kind);
                    report.unsupported = true;
                    break;
                }
                Err(e) if e.aborts_run() => return Err(e),
                Err(e) => {
                    if matches!(e, CoreError::UnresolvedReference { .. }) {
                        warn!("{e}, skipping");
                    } else {
                        error!("{e}");
                    }
                    report.skipped.push(skipped(kind, source_id, Some(&key), &e));
                }
            }
        }

        if !report.unsupported {
            let verb = match self.mode {
                Mode::Apply => "Wrote",
                Mode::Plan => "Planned",
            };
            info!("{verb} {} {}.", report.processed(), kind.plural());
        }
        Ok(())
    }

    async fn upsert(&mut self, entity: &Entity, key: &NaturalKey) -> Result<Outcome, CoreError> {
        let kind = entity.kind();
        let payload = self.translate(entity)?;
        let key_text = key.to_string();

        let matches = self
            .destination
            .search(key)
            .await
            .map_err(|e| e.while_writing(kind, &key_text))?;
        if matches.len() > 1 {
            warn!(
                "{} matches for {kind} {key} on {}, using the first ({})",
                matches.len(),
                self.destination.name(),
                matches[0].id()
            );
        }
        let existing = matches.first().map(Entity::id);

        match (self.mode, existing) {
            (Mode::Plan, Some(id)) => {
                self.maps.record(kind, entity.id(), id);
                Ok(Outcome::WouldUpdate(id))
            }
            (Mode::Plan, None) => {
                self.maps.plan(kind, entity.id());
                Ok(Outcome::WouldCreate)
            }
            (Mode::Apply, Some(id)) => {
                let dest = self
                    .destination
                    .update(id, &payload)
                    .await
                    .map_err(|e| e.while_writing(kind, &key_text))?;
                self.maps.record(kind, entity.id(), dest.id());
                Ok(Outcome::Updated(dest))
            }
            (Mode::Apply, None) => {
                let dest = self
                    .destination
                    .create(&payload)
                    .await
                    .map_err(|e| e.while_writing(kind, &key_text))?;
                self.maps.record(kind, entity.id(), dest.id());
                Ok(Outcome::Created(dest))
            }
        }
    }

    // ── Payload translation ─────────────────────────────────────────

    /// Rewrite migrated references to destination ids and drop the ones
    /// this tool does not carry across (site, tenant, status, NAT, RIR).
    fn translate(&self, entity: &Entity) -> Result<Entity, CoreError> {
        let kind = entity.kind();
        let id = entity.id();
        let remap = |target: EntityKind, reference: Option<ObjectId>| {
            self.remap(kind, id, target, reference)
        };

        Ok(match entity {
            Entity::Role(r) => Entity::Role(r.clone()),
            Entity::VlanGroup(g) => Entity::VlanGroup(VlanGroup {
                site: None,
                ..g.clone()
            }),
            Entity::Vlan(v) => Entity::Vlan(Vlan {
                vlan_group: remap(EntityKind::VlanGroup, v.vlan_group)?,
                tenant: None,
                site: None,
                status: None,
                ..v.clone()
            }),
            Entity::Vrf(v) => Entity::Vrf(Vrf {
                tenant: None,
                ..v.clone()
            }),
            Entity::Prefix(p) => Entity::Prefix(Prefix {
                vlan_id: remap(EntityKind::Vlan, p.vlan_id)?,
                vrf_id: remap(EntityKind::Vrf, p.vrf_id)?,
                role_id: remap(EntityKind::Role, p.role_id)?,
                site: None,
                tenant: None,
                status: None,
                ..p.clone()
            }),
            Entity::IpAddress(a) => Entity::IpAddress(IpAddress {
                vrf_id: remap(EntityKind::Vrf, a.vrf_id)?,
                nat_inside_id: None,
                nat_outside_id: None,
                status: None,
                tenant: None,
                ..a.clone()
            }),
            Entity::Aggregate(a) => Entity::Aggregate(Aggregate {
                rir: None,
                ..a.clone()
            }),
        })
    }

    /// Null stays null. A reference to something not migrated is an error.
    ///
    /// In plan mode a reference to a would-create entity keeps its source
    /// id as a placeholder; the payload is never sent. A reference to a
    /// kind the destination cannot store becomes null.
    fn remap(
        &self,
        kind: EntityKind,
        id: ObjectId,
        target: EntityKind,
        reference: Option<ObjectId>,
    ) -> Result<Option<ObjectId>, CoreError> {
        let Some(reference) = reference else {
            return Ok(None);
        };
        match self.maps.resolve(target, reference) {
            Resolution::Mapped(new) => Ok(Some(new)),
            Resolution::Planned => Ok(Some(reference)),
            Resolution::Dropped => {
                debug!("{kind} {id}: dropping reference to {target} {reference}");
                Ok(None)
            }
            Resolution::Unresolved => Err(CoreError::UnresolvedReference {
                kind,
                id,
                target,
                reference,
            }),
        }
    }
}

fn skipped(
    kind: EntityKind,
    source_id: ObjectId,
    key: Option<&NaturalKey>,
    err: &CoreError,
) -> SkippedItem {
    SkippedItem {
        kind,
        source_id,
        key: key.map(ToString::to_string),
        reason: err.to_string(),
    }
}
