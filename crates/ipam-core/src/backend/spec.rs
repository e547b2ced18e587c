// ── Backend construction tuple ──
//
// `ENDPOINT,KIND,AUTH-METHOD,AUTH-DATA...` parsed and validated before
// any I/O. Every failure here is a `CoreError::Configuration`.

use std::fmt;
use std::str::FromStr;

use ipam_api::{TlsMode, TransportConfig};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    PhpIpam,
    NetBox,
}

impl BackendKind {
    /// Auth methods this kind accepts, in the order they are listed to users.
    pub fn auth_methods(self) -> &'static [&'static str] {
        match self {
            Self::PhpIpam => &["login"],
            Self::NetBox => &["key", "token"],
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhpIpam => f.write_str("phpipam"),
            Self::NetBox => f.write_str("netbox"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phpipam" => Ok(Self::PhpIpam),
            "netbox" => Ok(Self::NetBox),
            other => Err(config_error(format!(
                "unknown backend type '{other}', expected 'phpipam' or 'netbox'"
            ))),
        }
    }
}

/// Credentials for one backend.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// NetBox API token (auth method `key` or `token`).
    Token(SecretString),
    /// phpIPAM user name and password (auth method `login`).
    Login { user: String, password: SecretString },
}

impl Credentials {
    pub(crate) fn token(&self) -> Result<&SecretString, CoreError> {
        match self {
            Self::Token(token) => Ok(token),
            Self::Login { .. } => Err(config_error("NetBox needs an API token, not a login")),
        }
    }

    pub(crate) fn login(&self) -> Result<(&str, &SecretString), CoreError> {
        match self {
            Self::Login { user, password } => Ok((user, password)),
            Self::Token(_) => Err(config_error("phpIPAM needs a user name and password, not a token")),
        }
    }
}

/// A fully validated backend description.
#[derive(Debug, Clone)]
pub struct BackendSpec {
    pub endpoint: Url,
    pub kind: BackendKind,
    pub credentials: Credentials,
    pub ssl_verify: bool,
}

impl BackendSpec {
    /// Validate the parts of a backend description.
    ///
    /// `auth_data` is the comma-separated tail of the tuple. For `login`
    /// the first datum is the user and the rest, rejoined with commas, is
    /// the password.
    pub fn new(
        endpoint: &str,
        kind: &str,
        auth_method: &str,
        auth_data: &[String],
    ) -> Result<Self, CoreError> {
        let kind: BackendKind = kind.parse()?;
        let endpoint = parse_endpoint(endpoint, kind)?;
        let method = auth_method.trim().to_ascii_lowercase();

        if !kind.auth_methods().contains(&method.as_str()) {
            return Err(config_error(format!(
                "unsupported auth method '{method}' for {kind}, expected {}",
                quoted_list(kind.auth_methods())
            )));
        }

        let credentials = match kind {
            BackendKind::NetBox => match auth_data {
                [token] if !token.trim().is_empty() => {
                    Credentials::Token(SecretString::from(token.trim().to_owned()))
                }
                [] | [_] => {
                    return Err(config_error(format!("auth method '{method}' needs an API token")));
                }
                _ => {
                    return Err(config_error(format!(
                        "auth method '{method}' takes exactly one value, got {}",
                        auth_data.len()
                    )));
                }
            },
            BackendKind::PhpIpam => match auth_data {
                [user, rest @ ..] if !user.trim().is_empty() && !rest.is_empty() => Credentials::Login {
                    user: user.trim().to_owned(),
                    password: SecretString::from(rest.join(",")),
                },
                _ => {
                    return Err(config_error(
                        "auth method 'login' needs a user name and a password",
                    ));
                }
            },
        };

        Ok(Self {
            endpoint,
            kind,
            credentials,
            ssl_verify: true,
        })
    }

    pub fn with_ssl_verify(mut self, ssl_verify: bool) -> Self {
        self.ssl_verify = ssl_verify;
        self
    }

    /// Transport settings for this backend, honouring `ssl_verify`.
    pub fn transport(&self, base: &TransportConfig) -> TransportConfig {
        let mut transport = base.clone();
        if !self.ssl_verify {
            transport.tls = TlsMode::DangerAcceptInvalid;
        }
        transport
    }
}

impl FromStr for BackendSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Auth data is kept verbatim: spaces can be part of a password.
        let mut parts = s.split(',');
        let (Some(endpoint), Some(kind), Some(method)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(config_error(format!(
                "expected ENDPOINT,TYPE,AUTH-METHOD,AUTH-DATA..., got '{}'",
                redact_tail(s)
            )));
        };
        let data: Vec<String> = parts.map(str::to_owned).collect();
        Self::new(endpoint.trim(), kind.trim(), method.trim(), &data)
    }
}

fn parse_endpoint(raw: &str, kind: BackendKind) -> Result<Url, CoreError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| config_error(format!("invalid endpoint URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(config_error(format!(
            "endpoint URL '{raw}' must use http or https"
        )));
    }
    if kind == BackendKind::PhpIpam {
        let has_app = url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .is_some();
        if !has_app {
            return Err(config_error(format!(
                "phpIPAM endpoint '{raw}' must end with the application id, e.g. https://host/api/<app>"
            )));
        }
    }
    Ok(url)
}

fn quoted_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("'{i}'")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

/// Show the endpoint and type of a malformed tuple but never its secrets.
fn redact_tail(raw: &str) -> String {
    raw.splitn(3, ',').take(2).collect::<Vec<_>>().join(",")
}

fn config_error(message: impl Into<String>) -> CoreError {
    CoreError::Configuration {
        message: message.into(),
    }
}
