//! Domain model and migration engine for moving IPAM data between
//! phpIPAM and NetBox.
//!
//! - **[`Snapshot`]**: an immutable inventory read from one backend,
//!   built through [`SnapshotBuilder`] and shaped by [`ReadOptions`].
//!
//! - **[`Backend`] / [`Destination`]**: the read/write contract and the
//!   lower-level search/create/update contract the engine drives.
//!   [`AnyBackend`] picks an implementation at runtime from a
//!   [`BackendSpec`] (`ENDPOINT,KIND,AUTH-METHOD,AUTH-DATA...`).
//!
//! - **[`Engine`]**: writes a snapshot kind by kind in dependency order,
//!   matching existing objects by [`NaturalKey`] and rewriting references
//!   through old→new id tables. The result is a [`WriteReport`].

pub mod backend;
pub mod convert;
pub mod error;
pub mod migrate;
pub mod model;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{AnyBackend, Backend, BackendKind, BackendSpec, Credentials, Destination};
pub use error::CoreError;
pub use migrate::{Engine, Mode, NaturalKey, SkippedItem, WriteReport, dump, migrate};
pub use model::{
    Aggregate, Entity, EntityKind, Family, IpAddress, ObjectId, Prefix, Role, Vid, Vlan,
    VlanGroup, Vrf,
};
pub use snapshot::{ReadOptions, Snapshot, SnapshotBuilder};
