// ── Core error types ──
//
// Errors surfaced by ipam-core. Consumers never see raw JSON or reqwest
// failures: the `From<ipam_api::Error>` impl below folds them into
// connection, authentication and remote-rejection variants, and the
// adapters and engine attach read/write context on top.

use thiserror::Error;

use crate::model::{EntityKind, ObjectId};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Setup ────────────────────────────────────────────────────────
    /// Bad backend tuple, unsupported auth method, missing auth data.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out: {reason}")]
    Timeout { reason: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Remote rejections ────────────────────────────────────────────
    /// A backend answered with an error that has no read/write context yet.
    #[error("API error{}: {message}", fmt_status(*status))]
    Api { status: Option<u16>, message: String },

    #[error("Failed to read {what} from {backend}{}: {message}", fmt_status(*status))]
    Read {
        backend: String,
        what: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to write {kind} {key}{}: {message}", fmt_status(*status))]
    Write {
        kind: EntityKind,
        key: String,
        status: Option<u16>,
        message: String,
    },

    // ── Migration ────────────────────────────────────────────────────
    #[error("{backend} cannot write {}", kind.plural())]
    UnsupportedEntity { backend: String, kind: EntityKind },

    #[error("{kind} {id} references {target} {reference}, which was not migrated")]
    UnresolvedReference {
        kind: EntityKind,
        id: ObjectId,
        target: EntityKind,
        reference: ObjectId,
    },

    #[error("Invalid {kind} record {id}: {reason}")]
    InvalidRecord {
        kind: EntityKind,
        id: String,
        reason: String,
    },

    #[error("Interrupted")]
    Interrupted,

    #[error("Internal error: {0}")]
    Internal(String),
}

fn fmt_status(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl CoreError {
    /// Whether this error ends the whole run rather than a single item.
    ///
    /// Connection loss and rejected credentials affect every following
    /// request, so there is no point carrying on.
    pub fn aborts_run(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::Timeout { .. }
                | Self::Authentication { .. }
                | Self::Interrupted
                | Self::Configuration { .. }
        )
    }

    /// Attach read context to a remote failure.
    ///
    /// Connection and authentication failures pass through unchanged so
    /// callers can still tell them apart.
    pub fn while_reading(self, backend: &str, what: &str) -> Self {
        match self {
            Self::Api { status, message } => Self::Read {
                backend: backend.to_owned(),
                what: what.to_owned(),
                status,
                message,
            },
            Self::Internal(message) => Self::Read {
                backend: backend.to_owned(),
                what: what.to_owned(),
                status: None,
                message,
            },
            other => other,
        }
    }

    /// Attach write context (kind and natural key) to a remote failure.
    pub fn while_writing(self, kind: EntityKind, key: &str) -> Self {
        match self {
            Self::Api { status, message } => Self::Write {
                kind,
                key: key.to_owned(),
                status,
                message,
            },
            Self::Internal(message) => Self::Write {
                kind,
                key: key.to_owned(),
                status: None,
                message,
            },
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ipam_api::Error> for CoreError {
    fn from(err: ipam_api::Error) -> Self {
        match err {
            ipam_api::Error::Authentication { message } => CoreError::Authentication { message },
            ipam_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout {
                        reason: e.to_string(),
                    }
                } else if e.is_connect() || e.is_request() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        status: e.status().map(|s| s.as_u16()),
                        message: e.to_string(),
                    }
                }
            }
            ipam_api::Error::InvalidUrl(e) => CoreError::Configuration {
                message: format!("Invalid URL: {e}"),
            },
            ipam_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ipam_api::Error::Api { status, message } => CoreError::Api {
                status: Some(status),
                message,
            },
            ipam_api::Error::PhpIpam { code, message } => CoreError::Api {
                status: Some(code),
                message,
            },
            ipam_api::Error::UnexpectedResponse { message } => CoreError::Api {
                status: None,
                message,
            },
            ipam_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_rejection_gains_write_context() {
        let err = CoreError::from(ipam_api::Error::Api {
            status: 400,
            message: "vid: required".into(),
        })
        .while_writing(EntityKind::Vlan, "vid=100");

        assert!(!err.aborts_run());
        assert_eq!(err.to_string(), "Failed to write vlan vid=100 (HTTP 400): vid: required");
    }

    #[test]
    fn authentication_passes_through_context() {
        let err = CoreError::from(ipam_api::Error::Authentication {
            message: "bad token".into(),
        })
        .while_reading("input", "VLANs");

        assert!(matches!(err, CoreError::Authentication { .. }));
        assert!(err.aborts_run());
    }

    #[test]
    fn phpipam_codes_become_status() {
        let err = CoreError::from(ipam_api::Error::PhpIpam {
            code: 409,
            message: "Vlan already exists".into(),
        })
        .while_reading("input", "VLANs");

        assert!(matches!(err, CoreError::Read { status: Some(409), .. }));
    }
}
