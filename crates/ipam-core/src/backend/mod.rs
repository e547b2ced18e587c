// ── Backend interface ──
//
// `Backend` is what the CLI drives: read a snapshot, write one. `Destination`
// is the narrower search/create/update contract the migration engine runs
// against; every backend is a destination, and tests can supply their own.

use std::future::Future;

use ipam_api::TransportConfig;

use crate::error::CoreError;
use crate::migrate::{Engine, Mode, NaturalKey, WriteReport};
use crate::model::{Entity, ObjectId};
use crate::snapshot::{ReadOptions, Snapshot};

pub mod netbox;
pub mod phpipam;
pub mod spec;

pub use netbox::NetBoxBackend;
pub use phpipam::PhpIpamBackend;
pub use spec::{BackendKind, BackendSpec, Credentials};

/// The lower-level write contract the engine drives.
pub trait Destination: Send + Sync {
    /// Label used in logs and reports ("input", "output", a profile name).
    fn name(&self) -> &str;

    /// Candidates equal to `key`, in destination order.
    fn search(
        &self,
        key: &NaturalKey,
    ) -> impl Future<Output = Result<Vec<Entity>, CoreError>> + Send;

    /// Create `payload`, returning the destination's record.
    fn create(&self, payload: &Entity) -> impl Future<Output = Result<Entity, CoreError>> + Send;

    /// Replace object `id` with `payload`, returning the destination's record.
    fn update(
        &self,
        id: ObjectId,
        payload: &Entity,
    ) -> impl Future<Output = Result<Entity, CoreError>> + Send;
}

/// A readable, writable IPAM system.
pub trait Backend: Destination {
    /// Read every kind `options` asks for.
    fn read(&self, options: ReadOptions) -> impl Future<Output = Result<Snapshot, CoreError>> + Send;

    /// Migrate `snapshot` into this backend.
    fn write(
        &self,
        snapshot: &Snapshot,
        mode: Mode,
    ) -> impl Future<Output = Result<WriteReport, CoreError>> + Send {
        Engine::new(self, mode).run(snapshot)
    }
}

// ── Runtime dispatch ────────────────────────────────────────────────

/// A backend chosen at runtime from a [`BackendSpec`].
pub enum AnyBackend {
    NetBox(NetBoxBackend),
    PhpIpam(PhpIpamBackend),
}

impl AnyBackend {
    /// Build the HTTP client for `spec`. No request is made until the
    /// first read or write.
    pub fn connect(
        name: impl Into<String>,
        spec: &BackendSpec,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let transport = spec.transport(transport);
        match spec.kind {
            BackendKind::NetBox => {
                let token = spec.credentials.token()?;
                let client = ipam_api::NetBoxClient::new(spec.endpoint.as_str(), token, &transport)?;
                Ok(Self::NetBox(NetBoxBackend::new(name, client)))
            }
            BackendKind::PhpIpam => {
                let (user, password) = spec.credentials.login()?;
                let client = ipam_api::PhpIpamClient::new(
                    spec.endpoint.as_str(),
                    user,
                    password.clone(),
                    &transport,
                )?;
                Ok(Self::PhpIpam(PhpIpamBackend::new(name, client)))
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::NetBox(_) => BackendKind::NetBox,
            Self::PhpIpam(_) => BackendKind::PhpIpam,
        }
    }
}

impl Destination for AnyBackend {
    fn name(&self) -> &str {
        match self {
            Self::NetBox(b) => b.name(),
            Self::PhpIpam(b) => b.name(),
        }
    }

    async fn search(&self, key: &NaturalKey) -> Result<Vec<Entity>, CoreError> {
        match self {
            Self::NetBox(b) => b.search(key).await,
            Self::PhpIpam(b) => b.search(key).await,
        }
    }

    async fn create(&self, payload: &Entity) -> Result<Entity, CoreError> {
        match self {
            Self::NetBox(b) => b.create(payload).await,
            Self::PhpIpam(b) => b.create(payload).await,
        }
    }

    async fn update(&self, id: ObjectId, payload: &Entity) -> Result<Entity, CoreError> {
        match self {
            Self::NetBox(b) => b.update(id, payload).await,
            Self::PhpIpam(b) => b.update(id, payload).await,
        }
    }
}

impl Backend for AnyBackend {
    async fn read(&self, options: ReadOptions) -> Result<Snapshot, CoreError> {
        match self {
            Self::NetBox(b) => b.read(options).await,
            Self::PhpIpam(b) => b.read(options).await,
        }
    }
}
