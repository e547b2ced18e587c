// ── Domain model ──
//
// Backend-neutral IPAM records. Adapters convert wire types into these
// (see `convert.rs`); the engine only ever sees this module's types.

pub mod entity;
pub mod id;
pub mod ip_address;
pub mod kind;
pub mod prefix;
pub mod role;
pub mod vlan;
pub mod vrf;

pub use entity::Entity;
pub use id::{Family, ObjectId, Vid, parse_host, parse_network};
pub use ip_address::IpAddress;
pub use kind::EntityKind;
pub use prefix::{Aggregate, Prefix};
pub use role::Role;
pub use vlan::{Vlan, VlanGroup};
pub use vrf::Vrf;
