use thiserror::Error;

/// Top-level error type for the `ipam-api` crate.
///
/// Covers every failure mode across both API surfaces: authentication,
/// transport, NetBox and phpIPAM responses. `ipam-core` maps these into
/// read/write diagnostics that carry entity context.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or the token was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── NetBox ──────────────────────────────────────────────────────
    /// Non-success HTTP status from a REST endpoint.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── phpIPAM ─────────────────────────────────────────────────────
    /// Error from the phpIPAM `{code, success, message}` envelope.
    #[error("phpIPAM error {code}: {message}")]
    PhpIpam { code: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The server answered, but not in the way the protocol requires.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Connection failures, timeouts, HTTP 5xx and 429 qualify. Every other
    /// 4xx is the caller's fault and fails fast.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }

    /// Returns `true` if phpIPAM answered "nothing here" for a lookup.
    ///
    /// phpIPAM reports empty collections and missing VLANs as a 404
    /// envelope with one of a few fixed messages. Any other 404, such as a
    /// proxy's HTML page or an unknown controller, is a real failure.
    pub fn is_empty_result(&self) -> bool {
        match self {
            Self::PhpIpam { code: 404, message } => {
                let message = message.trim();
                EMPTY_RESULT_MESSAGES
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(message))
            }
            _ => false,
        }
    }

    /// HTTP (or envelope) status code, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
            Self::PhpIpam { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Envelope messages phpIPAM uses for an empty result.
const EMPTY_RESULT_MESSAGES: &[&str] = &[
    "No sections available",
    "No subnets found",
    "No addresses found",
    "No vrfs configured",
    "No vlans configured",
    "Vlan not found",
    "Vlans not found",
];

pub(crate) fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_fail_fast() {
        let err = Error::Api {
            status: 400,
            message: "vid: required".into(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn known_phpipam_404_is_empty_result() {
        let err = Error::PhpIpam {
            code: 404,
            message: "No subnets found".into(),
        };
        assert!(err.is_empty_result());
        assert!(!err.is_transient());
    }

    #[test]
    fn other_404s_are_not_empty_results() {
        let html = Error::Api {
            status: 404,
            message: "<html>404 Not Found</html>".into(),
        };
        let controller = Error::PhpIpam {
            code: 404,
            message: "Invalid controller".into(),
        };
        assert!(!html.is_empty_result());
        assert!(!controller.is_empty_result());
    }
}
