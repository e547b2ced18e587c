// ── Write report ──
//
// What a migration run did, per kind: counts, skipped items, the id
// translation table and the destination records written.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Entity, EntityKind, ObjectId};

/// Whether the engine writes or only plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Apply,
    /// Search only; classify each entity as would-create / would-update.
    Plan,
}

/// An entity the run could not migrate, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub kind: EntityKind,
    pub source_id: ObjectId,
    /// Natural key, when the entity had one.
    pub key: Option<String>,
    pub reason: String,
}

/// Results for one entity kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KindReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<SkippedItem>,
    /// The destination cannot write this kind; nothing was attempted.
    pub unsupported: bool,
    /// Source id → destination id.
    pub id_map: BTreeMap<ObjectId, ObjectId>,
    /// Destination id → record as the destination returned it.
    pub written: BTreeMap<ObjectId, Entity>,
}

impl KindReport {
    pub fn processed(&self) -> usize {
        self.created + self.updated
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub destination: String,
    pub mode: Mode,
    pub kinds: BTreeMap<EntityKind, KindReport>,
}

impl WriteReport {
    pub fn new(destination: impl Into<String>, mode: Mode) -> Self {
        Self {
            destination: destination.into(),
            mode,
            kinds: BTreeMap::new(),
        }
    }

    pub fn kind(&self, kind: EntityKind) -> Option<&KindReport> {
        self.kinds.get(&kind)
    }

    pub(crate) fn kind_mut(&mut self, kind: EntityKind) -> &mut KindReport {
        self.kinds.entry(kind).or_default()
    }

    pub fn id_map(&self, kind: EntityKind) -> Option<&BTreeMap<ObjectId, ObjectId>> {
        self.kinds.get(&kind).map(|k| &k.id_map)
    }

    pub fn written(&self, kind: EntityKind) -> Option<&BTreeMap<ObjectId, Entity>> {
        self.kinds.get(&kind).map(|k| &k.written)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedItem> {
        self.kinds.values().flat_map(|k| k.skipped.iter())
    }

    pub fn has_skips(&self) -> bool {
        self.skipped().next().is_some()
    }

    pub fn unsupported(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.kinds
            .iter()
            .filter(|(_, k)| k.unsupported)
            .map(|(kind, _)| *kind)
    }

    /// One line per kind: `Wrote 3 VLANs (1 created, 2 updated, 0 skipped).`
    pub fn summary_lines(&self) -> Vec<String> {
        self.kinds
            .iter()
            .map(|(kind, k)| {
                let label = kind.plural();
                if k.unsupported {
                    return format!("Skipped {label}: not supported by {}.", self.destination);
                }
                let verb = match self.mode {
                    Mode::Apply => "Wrote",
                    Mode::Plan => "Would write",
                };
                let (created, updated) = match self.mode {
                    Mode::Apply => ("created", "updated"),
                    Mode::Plan => ("to create", "to update"),
                };
                format!(
                    "{verb} {} {label} ({} {created}, {} {updated}, {} skipped).",
                    k.processed(),
                    k.created,
                    k.updated,
                    k.skipped.len(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_per_kind() {
        let mut report = WriteReport::new("output", Mode::Apply);
        let vlans = report.kind_mut(EntityKind::Vlan);
        vlans.created = 2;
        vlans.updated = 1;
        report.kind_mut(EntityKind::Aggregate).unsupported = true;

        assert_eq!(
            report.summary_lines(),
            vec![
                "Wrote 3 VLANs (2 created, 1 updated, 0 skipped).".to_owned(),
                "Skipped aggregates: not supported by output.".to_owned(),
            ]
        );
    }

    #[test]
    fn plan_summary_uses_conditional() {
        let mut report = WriteReport::new("output", Mode::Plan);
        report.kind_mut(EntityKind::Prefix).created = 1;
        assert_eq!(
            report.summary_lines(),
            vec!["Would write 1 prefixes (1 to create, 0 to update, 0 skipped).".to_owned()]
        );
    }
}
