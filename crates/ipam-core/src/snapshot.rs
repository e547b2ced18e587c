// ── Database snapshot ──
//
// Everything read from one backend at one point in time. Built once
// through `SnapshotBuilder`; a built `Snapshot` has no mutating methods.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    Aggregate, Entity, EntityKind, IpAddress, ObjectId, Prefix, Role, Vlan, VlanGroup, Vrf,
};

// ── ReadOptions ─────────────────────────────────────────────────────

/// Which entity kinds to read. Every flag defaults to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReadOptions {
    pub read_ip_addresses: bool,
    pub read_prefixes: bool,
    pub read_vlans: bool,
    pub read_vrfs: bool,
    pub read_roles: bool,
    pub read_aggregates: bool,
    pub read_vlan_groups: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            read_ip_addresses: true,
            read_prefixes: true,
            read_vlans: true,
            read_vrfs: true,
            read_roles: true,
            read_aggregates: true,
            read_vlan_groups: true,
        }
    }
}

impl ReadOptions {
    fn flag_mut(&mut self, kind: EntityKind) -> &mut bool {
        match kind {
            EntityKind::Role => &mut self.read_roles,
            EntityKind::VlanGroup => &mut self.read_vlan_groups,
            EntityKind::Vlan => &mut self.read_vlans,
            EntityKind::Vrf => &mut self.read_vrfs,
            EntityKind::Prefix => &mut self.read_prefixes,
            EntityKind::IpAddress => &mut self.read_ip_addresses,
            EntityKind::Aggregate => &mut self.read_aggregates,
        }
    }

    pub fn reads(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Role => self.read_roles,
            EntityKind::VlanGroup => self.read_vlan_groups,
            EntityKind::Vlan => self.read_vlans,
            EntityKind::Vrf => self.read_vrfs,
            EntityKind::Prefix => self.read_prefixes,
            EntityKind::IpAddress => self.read_ip_addresses,
            EntityKind::Aggregate => self.read_aggregates,
        }
    }

    pub fn set(&mut self, kind: EntityKind, read: bool) {
        *self.flag_mut(kind) = read;
    }

    /// Clear the flag for each kind in `kinds`.
    pub fn skipping(mut self, kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        for kind in kinds {
            self.set(kind, false);
        }
        self
    }
}

// ── Snapshot ────────────────────────────────────────────────────────

/// An immutable inventory read from one backend.
///
/// Kinds that were not read are empty maps; [`Snapshot::read_options`]
/// tells "not read" apart from "read, nothing there".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    backend: String,
    read_options: ReadOptions,
    roles: BTreeMap<ObjectId, Role>,
    vlan_groups: BTreeMap<ObjectId, VlanGroup>,
    vlans: BTreeMap<ObjectId, Vlan>,
    vrfs: BTreeMap<ObjectId, Vrf>,
    prefixes: BTreeMap<ObjectId, Prefix>,
    ip_addresses: BTreeMap<ObjectId, IpAddress>,
    aggregates: BTreeMap<ObjectId, Aggregate>,
}

/// A non-null reference to an entity the snapshot does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub kind: EntityKind,
    pub id: ObjectId,
    pub target: EntityKind,
    pub reference: ObjectId,
}

impl Snapshot {
    pub fn builder(backend: impl Into<String>, read_options: ReadOptions) -> SnapshotBuilder {
        SnapshotBuilder::new(backend, read_options)
    }

    /// Name of the backend this snapshot was read from.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// The options actually in effect, including flags a backend forced on.
    pub fn read_options(&self) -> ReadOptions {
        self.read_options
    }

    pub fn roles(&self) -> &BTreeMap<ObjectId, Role> {
        &self.roles
    }

    pub fn vlan_groups(&self) -> &BTreeMap<ObjectId, VlanGroup> {
        &self.vlan_groups
    }

    pub fn vlans(&self) -> &BTreeMap<ObjectId, Vlan> {
        &self.vlans
    }

    pub fn vrfs(&self) -> &BTreeMap<ObjectId, Vrf> {
        &self.vrfs
    }

    pub fn prefixes(&self) -> &BTreeMap<ObjectId, Prefix> {
        &self.prefixes
    }

    pub fn ip_addresses(&self) -> &BTreeMap<ObjectId, IpAddress> {
        &self.ip_addresses
    }

    pub fn aggregates(&self) -> &BTreeMap<ObjectId, Aggregate> {
        &self.aggregates
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Role => self.roles.len(),
            EntityKind::VlanGroup => self.vlan_groups.len(),
            EntityKind::Vlan => self.vlans.len(),
            EntityKind::Vrf => self.vrfs.len(),
            EntityKind::Prefix => self.prefixes.len(),
            EntityKind::IpAddress => self.ip_addresses.len(),
            EntityKind::Aggregate => self.aggregates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::MIGRATION_ORDER
            .iter()
            .all(|&kind| self.count(kind) == 0)
    }

    /// Entities of one kind in ascending id order.
    pub fn entities(&self, kind: EntityKind) -> Vec<Entity> {
        fn collect<T: Clone + Into<Entity>>(map: &BTreeMap<ObjectId, T>) -> Vec<Entity> {
            map.values().cloned().map(Into::into).collect()
        }

        match kind {
            EntityKind::Role => collect(&self.roles),
            EntityKind::VlanGroup => collect(&self.vlan_groups),
            EntityKind::Vlan => collect(&self.vlans),
            EntityKind::Vrf => collect(&self.vrfs),
            EntityKind::Prefix => collect(&self.prefixes),
            EntityKind::IpAddress => collect(&self.ip_addresses),
            EntityKind::Aggregate => collect(&self.aggregates),
        }
    }

    fn contains(&self, kind: EntityKind, id: ObjectId) -> bool {
        match kind {
            EntityKind::Role => self.roles.contains_key(&id),
            EntityKind::VlanGroup => self.vlan_groups.contains_key(&id),
            EntityKind::Vlan => self.vlans.contains_key(&id),
            EntityKind::Vrf => self.vrfs.contains_key(&id),
            EntityKind::Prefix => self.prefixes.contains_key(&id),
            EntityKind::IpAddress => self.ip_addresses.contains_key(&id),
            EntityKind::Aggregate => self.aggregates.contains_key(&id),
        }
    }

    /// Every migrated reference that points outside the snapshot.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for kind in EntityKind::MIGRATION_ORDER {
            for entity in self.entities(kind) {
                for (target, reference) in migrated_references(&entity) {
                    if !self.contains(target, reference) {
                        dangling.push(DanglingReference {
                            kind,
                            id: entity.id(),
                            target,
                            reference,
                        });
                    }
                }
            }
        }
        dangling
    }
}

/// The references the engine remaps, as `(target kind, id)` pairs.
pub fn migrated_references(entity: &Entity) -> Vec<(EntityKind, ObjectId)> {
    let pairs: Vec<(EntityKind, Option<ObjectId>)> = match entity {
        Entity::Vlan(v) => vec![(EntityKind::VlanGroup, v.vlan_group)],
        Entity::Prefix(p) => vec![
            (EntityKind::Vlan, p.vlan_id),
            (EntityKind::Vrf, p.vrf_id),
            (EntityKind::Role, p.role_id),
        ],
        Entity::IpAddress(a) => vec![(EntityKind::Vrf, a.vrf_id)],
        Entity::Role(_) | Entity::VlanGroup(_) | Entity::Vrf(_) | Entity::Aggregate(_) => {
            Vec::new()
        }
    };
    pairs
        .into_iter()
        .filter_map(|(kind, id)| id.map(|id| (kind, id)))
        .collect()
}

// ── SnapshotBuilder ─────────────────────────────────────────────────

/// Collects entities during a read, then freezes them into a [`Snapshot`].
#[derive(Debug)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new(backend: impl Into<String>, read_options: ReadOptions) -> Self {
        Self {
            snapshot: Snapshot {
                backend: backend.into(),
                read_options,
                roles: BTreeMap::new(),
                vlan_groups: BTreeMap::new(),
                vlans: BTreeMap::new(),
                vrfs: BTreeMap::new(),
                prefixes: BTreeMap::new(),
                ip_addresses: BTreeMap::new(),
                aggregates: BTreeMap::new(),
            },
        }
    }

    /// Add an entity; a later entity with the same kind and id replaces
    /// the earlier one.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> &mut Self {
        let s = &mut self.snapshot;
        match entity.into() {
            Entity::Role(e) => {
                s.roles.insert(e.id, e);
            }
            Entity::VlanGroup(e) => {
                s.vlan_groups.insert(e.id, e);
            }
            Entity::Vlan(e) => {
                s.vlans.insert(e.id, e);
            }
            Entity::Vrf(e) => {
                s.vrfs.insert(e.id, e);
            }
            Entity::Prefix(e) => {
                s.prefixes.insert(e.id, e);
            }
            Entity::IpAddress(e) => {
                s.ip_addresses.insert(e.id, e);
            }
            Entity::Aggregate(e) => {
                s.aggregates.insert(e.id, e);
            }
        }
        self
    }

    pub fn extend<I>(&mut self, entities: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Entity>,
    {
        for entity in entities {
            self.insert(entity);
        }
        self
    }

    /// Keep only the kinds the effective options ask for.
    pub fn build(self) -> Snapshot {
        let mut snapshot = self.snapshot;
        let options = snapshot.read_options;
        if !options.read_roles {
            snapshot.roles.clear();
        }
        if !options.read_vlan_groups {
            snapshot.vlan_groups.clear();
        }
        if !options.read_vlans {
            snapshot.vlans.clear();
        }
        if !options.read_vrfs {
            snapshot.vrfs.clear();
        }
        if !options.read_prefixes {
            snapshot.prefixes.clear();
        }
        if !options.read_ip_addresses {
            snapshot.ip_addresses.clear();
        }
        if !options.read_aggregates {
            snapshot.aggregates.clear();
        }
        snapshot
    }
}
