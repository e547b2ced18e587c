// ── Old→new id translation tables ──

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{EntityKind, ObjectId};

/// How a source reference resolves against what has been migrated so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Written (or matched) under this destination id.
    Mapped(ObjectId),
    /// Would be created by a plan-mode run; no destination id exists yet.
    Planned,
    /// The destination cannot store this kind, so references to it are
    /// left out of payloads.
    Dropped,
    /// Never migrated: skipped, failed, unsupported or not in the source.
    Unresolved,
}

/// Per-kind `old id → new id` tables for one run.
#[derive(Debug, Clone, Default)]
pub struct IdMaps {
    mapped: BTreeMap<EntityKind, BTreeMap<ObjectId, ObjectId>>,
    planned: BTreeMap<EntityKind, BTreeSet<ObjectId>>,
    unsupported: BTreeSet<EntityKind>,
}

impl IdMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: EntityKind, old: ObjectId, new: ObjectId) {
        self.mapped.entry(kind).or_default().insert(old, new);
    }

    pub fn plan(&mut self, kind: EntityKind, old: ObjectId) {
        self.planned.entry(kind).or_default().insert(old);
    }

    /// Record that the destination rejected `kind` as a whole.
    pub fn mark_unsupported(&mut self, kind: EntityKind) {
        self.unsupported.insert(kind);
    }

    pub fn get(&self, kind: EntityKind, old: ObjectId) -> Option<ObjectId> {
        self.mapped.get(&kind)?.get(&old).copied()
    }

    pub fn resolve(&self, kind: EntityKind, old: ObjectId) -> Resolution {
        if self.unsupported.contains(&kind) {
            Resolution::Dropped
        } else if let Some(new) = self.get(kind, old) {
            Resolution::Mapped(new)
        } else if self.planned.get(&kind).is_some_and(|p| p.contains(&old)) {
            Resolution::Planned
        } else {
            Resolution::Unresolved
        }
    }

    /// The table for one kind (empty if nothing was mapped).
    pub fn table(&self, kind: EntityKind) -> BTreeMap<ObjectId, ObjectId> {
        self.mapped.get(&kind).cloned().unwrap_or_default()
    }
}
