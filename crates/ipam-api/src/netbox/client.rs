// NetBox REST client
//
// Base path: {endpoint}/  (usually https://host/api)
// Auth: `Authorization: Token <token>` header on every request.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::models::Page;
use crate::error::Error;
use crate::transport::{RetryPolicy, TransportConfig, send_with_retry};

/// Page size requested from list endpoints.
const PAGE_LIMIT: u32 = 1000;

/// The `ipam` collections the migrator touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Roles,
    VlanGroups,
    Vlans,
    Vrfs,
    Prefixes,
    Aggregates,
    IpAddresses,
}

impl Resource {
    /// Collection path relative to the API root, with trailing slash.
    pub fn path(self) -> &'static str {
        match self {
            Self::Roles => "ipam/roles/",
            Self::VlanGroups => "ipam/vlan-groups/",
            Self::Vlans => "ipam/vlans/",
            Self::Vrfs => "ipam/vrfs/",
            Self::Prefixes => "ipam/prefixes/",
            Self::Aggregates => "ipam/aggregates/",
            Self::IpAddresses => "ipam/ip-addresses/",
        }
    }
}

/// Async client for the NetBox REST API.
pub struct NetBoxClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl NetBoxClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    ///
    /// Injects `Authorization: Token …` as a default header. NetBox's
    /// "key" and "token" auth methods both end up here; they differ only
    /// in how the operator names the credential.
    pub fn new(
        endpoint: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client(headers)?;
        Ok(Self {
            http,
            base_url: normalize_base_url(endpoint)?,
            retry: transport.retry,
        })
    }

    /// The API root every resource path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Fetch every object in a collection, following `next` links.
    ///
    /// `filters` become query parameters on the first request; NetBox
    /// carries them forward in the `next` URLs it hands back.
    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut url = self.url(resource.path())?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &PAGE_LIMIT.to_string());
            for (key, value) in filters {
                query.append_pair(key, value);
            }
        }

        let mut all = Vec::new();
        loop {
            debug!("GET {url}");
            let resp = send_with_retry(&self.retry, || self.http.get(url.clone())).await?;
            let page: Page<T> = self.handle_response(resp).await?;
            all.extend(page.results);

            match page.next {
                Some(next) if !next.is_empty() => url = Url::parse(&next)?,
                _ => break,
            }
        }

        Ok(all)
    }

    /// POST a new object. NetBox answers `201 Created` with the object.
    pub async fn create<T, B>(&self, resource: Resource, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.url(resource.path())?;
        debug!("POST {url}");

        let resp = send_with_retry(&self.retry, || self.http.post(url.clone()).json(body)).await?;

        // A 200 to a POST means something (usually an http→https redirect)
        // turned the request into a GET, and nothing was created.
        if resp.status() == StatusCode::OK {
            return Err(Error::UnexpectedResponse {
                message: format!(
                    "received 200 (OK) on a POST to {url}, expected 201 (Created); \
                     check that the request is not being redirected and converted to a GET"
                ),
            });
        }

        self.handle_response(resp).await
    }

    /// PUT a full replacement for an existing object.
    pub async fn update<T, B>(&self, resource: Resource, id: u64, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.url(&format!("{}{id}/", resource.path()))?;
        debug!("PUT {url}");

        let resp = send_with_retry(&self.retry, || self.http.put(url.clone()).json(body)).await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let url = resp.url().clone();
        let body = resp.text().await?;

        if status.is_success() {
            if body.is_empty() {
                return Err(Error::UnexpectedResponse {
                    message: format!("empty response (HTTP {status}) from {url}"),
                });
            }
            return serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            });
        }

        Err(parse_error(status, &url, &body))
    }
}

/// Ensure the endpoint ends with a slash so relative joins append to it.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}

fn parse_error(status: StatusCode, url: &Url, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication {
            message: format!("HTTP {status}: {}", detail_or_status(body, status)),
        },
        StatusCode::BAD_REQUEST => Error::Api {
            status: status.as_u16(),
            message: format!("bad request:\n{}", render_field_errors(body)),
        },
        StatusCode::METHOD_NOT_ALLOWED => Error::Api {
            status: status.as_u16(),
            message: format!("method not allowed at {url}, is the right URI being accessed?"),
        },
        _ => Error::Api {
            status: status.as_u16(),
            message: detail_or_status(body, status),
        },
    }
}

/// NetBox puts a human message in `{"detail": "..."}` on most failures.
fn detail_or_status(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.to_owned()
            }
        })
}

/// Render a DRF validation body (`{"field": ["msg", ...]}`) as indented lines.
fn render_field_errors(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => fields
            .iter()
            .map(|(field, msgs)| {
                let text = match msgs {
                    Value::Array(items) => items
                        .iter()
                        .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_owned))
                        .collect::<Vec<_>>()
                        .join("; "),
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("  {field}: {text}")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => format!("  {body}"),
    }
}
