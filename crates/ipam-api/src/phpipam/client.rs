// phpIPAM REST client
//
// Wraps `reqwest::Client` with phpIPAM URL construction, envelope
// unwrapping and token handling. The token lives in this client instance;
// every request goes through `ensure_authenticated()` first (see auth.rs).

use std::sync::Mutex;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::auth::TokenState;
use super::models::{ControllerMethods, Envelope, HrefMethods};
use crate::error::Error;
use crate::transport::{RetryPolicy, TransportConfig, send_with_retry};

/// Raw HTTP client for a phpIPAM application's REST API.
///
/// The endpoint is the application root, e.g. `https://ipam.example.com/api/migrator`.
/// All methods return the unwrapped `data` payload.
pub struct PhpIpamClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    username: String,
    password: SecretString,
    pub(super) token: Mutex<Option<TokenState>>,
}

impl PhpIpamClient {
    /// Create a client that logs in with `username`/`password` on first use.
    pub fn new(
        endpoint: &str,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(reqwest::header::HeaderMap::new())?;
        Self::with_client(endpoint, http, username, password, transport.retry)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        endpoint: &str,
        http: reqwest::Client,
        username: impl Into<String>,
        password: SecretString,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        let mut base_url = Url::parse(endpoint)?;
        let path = base_url.path().trim_end_matches('/').to_owned();
        base_url.set_path(&format!("{path}/"));

        Ok(Self {
            http,
            base_url,
            retry,
            username: username.into(),
            password,
            token: Mutex::new(None),
        })
    }

    /// The application root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(super) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(super) fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub(super) fn credentials(&self) -> (&str, &str) {
        (&self.username, self.password.expose_secret())
    }

    /// Build `{base}/{segments...}/`.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut path = segments.join("/");
        path.push('/');
        Ok(self.base_url.join(&path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a controller path and unwrap `data`.
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let envelope: Envelope<T> = self.request(Method::GET, segments, None::<&()>).await?;
        envelope.data.ok_or_else(|| Error::UnexpectedResponse {
            message: format!("response to GET {} carried no data", segments.join("/")),
        })
    }

    /// GET a collection, treating phpIPAM's "nothing here" answer as empty.
    ///
    /// Sub-collections with no members ("No subnets found", "No addresses
    /// found") come back as `success: false, code: 404`. Every other
    /// failure, 404s included, is returned as an error.
    pub async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, Error> {
        match self.get::<Vec<T>>(segments).await {
            Ok(items) => Ok(items),
            Err(e) if e.is_empty_result() => {
                debug!("{}: {e}", segments.join("/"));
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// POST a JSON body, returning the id of the created object.
    pub async fn create<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<u64, Error> {
        let envelope: Envelope<serde_json::Value> =
            self.request(Method::POST, segments, Some(body)).await?;
        envelope
            .id
            .or_else(|| envelope.data.as_ref().and_then(id_from_data))
            .ok_or_else(|| Error::UnexpectedResponse {
                message: format!(
                    "create at {} succeeded but returned no id",
                    segments.join("/")
                ),
            })
    }

    /// PATCH a JSON body onto an existing object.
    pub async fn patch<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> Result<(), Error> {
        let _: Envelope<serde_json::Value> =
            self.request(Method::PATCH, segments, Some(body)).await?;
        Ok(())
    }

    /// `OPTIONS {controller}/`: which methods each href supports.
    ///
    /// Older releases (before 1.3) refuse `GET vlan/`; this is how the
    /// reader finds out without provoking an error.
    pub async fn controller_methods(&self, controller: &str) -> Result<Vec<HrefMethods>, Error> {
        let envelope: Envelope<ControllerMethods> =
            self.request(Method::OPTIONS, &[controller], None::<&()>).await?;
        Ok(envelope.data.map(|d| d.methods).unwrap_or_default())
    }

    async fn request<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Envelope<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.url(segments)?;
        let mut logged_in_again = false;

        loop {
            let token = self.ensure_authenticated().await?;
            debug!("{method} {url}");

            let resp = send_with_retry(&self.retry, || {
                let req = self
                    .http
                    .request(method.clone(), url.clone())
                    .header("phpipam-token", token.expose_secret());
                match body {
                    Some(b) => req.json(b),
                    None => req,
                }
            })
            .await?;

            let status = resp.status();
            if status == reqwest::StatusCode::UNAUTHORIZED
                || status == reqwest::StatusCode::FORBIDDEN
            {
                self.invalidate_token();
                if !logged_in_again {
                    debug!("token rejected (HTTP {status}), logging in again");
                    logged_in_again = true;
                    continue;
                }
                return Err(Error::Authentication {
                    message: format!("token rejected (HTTP {status})"),
                });
            }

            let text = resp.text().await?;
            return parse_envelope(status, &text);
        }
    }
}

/// Decode the envelope, turning `success: false` into `Error::PhpIpam`.
pub(crate) fn parse_envelope<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<Envelope<T>, Error> {
    if body.is_empty() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: "(empty response)".into(),
        });
    }

    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(env) => env,
        Err(e) if status.is_success() => {
            return Err(Error::Deserialization {
                message: e.to_string(),
                body: body.to_owned(),
            });
        }
        Err(_) => {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.to_owned(),
            });
        }
    };

    if envelope.success {
        Ok(envelope)
    } else {
        let code = if envelope.code == 0 {
            status.as_u16()
        } else {
            envelope.code
        };
        Err(Error::PhpIpam {
            code,
            message: envelope
                .message
                .unwrap_or_else(|| format!("request failed with code {code}")),
        })
    }
}

fn id_from_data(data: &serde_json::Value) -> Option<u64> {
    match data.get("id")? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
