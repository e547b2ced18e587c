// ── Migration ──
//
// Entry points tying a source backend, a snapshot and a destination
// together. The algorithm itself lives in `engine.rs`.

mod engine;
mod id_map;
mod key;
mod report;

use tracing::{info, warn};

pub use engine::Engine;
pub use id_map::{IdMaps, Resolution};
pub use key::NaturalKey;
pub use report::{KindReport, Mode, SkippedItem, WriteReport};

use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::EntityKind;
use crate::snapshot::{ReadOptions, Snapshot};

/// Read `source` without writing anywhere.
pub async fn dump<S: Backend>(source: &S, options: ReadOptions) -> Result<Snapshot, CoreError> {
    let snapshot = source.read(options).await?;
    log_read_summary(&snapshot);
    Ok(snapshot)
}

/// Read `source` and migrate everything read into `destination`.
pub async fn migrate<S: Backend, D: Backend>(
    source: &S,
    destination: &D,
    options: ReadOptions,
    mode: Mode,
) -> Result<WriteReport, CoreError> {
    let snapshot = dump(source, options).await?;

    for dangling in snapshot.dangling_references() {
        warn!(
            "{} {} on {} references {} {}, which was not read; it will be skipped",
            dangling.kind,
            dangling.id,
            snapshot.backend(),
            dangling.target,
            dangling.reference
        );
    }

    destination.write(&snapshot, mode).await
}

fn log_read_summary(snapshot: &Snapshot) {
    let options = snapshot.read_options();
    for kind in EntityKind::MIGRATION_ORDER {
        if options.reads(kind) {
            info!(
                "Found {} {} on {}.",
                snapshot.count(kind),
                kind.plural(),
                snapshot.backend()
            );
        }
    }
}
