// phpIPAM token authentication
//
// `POST user/` with HTTP basic auth returns a token and its expiry. The
// token is kept on the client instance and reused until the expiry
// passes or the server rejects it.

use std::sync::{MutexGuard, PoisonError};

use chrono::{NaiveDateTime, Utc};
use secrecy::SecretString;
use tracing::debug;

use super::client::{PhpIpamClient, parse_envelope};
use super::models::TokenGrant;
use crate::error::Error;
use crate::transport::send_with_retry;

/// Expiry format phpIPAM uses, e.g. `2017-07-09 20:05:28`.
const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A token granted by `POST user/`.
#[derive(Debug, Clone)]
pub struct TokenState {
    pub token: SecretString,
    /// `None` when the server did not report an expiry; such tokens are
    /// reused until rejected.
    pub expires: Option<NaiveDateTime>,
}

impl TokenState {
    pub fn from_grant(grant: TokenGrant) -> Self {
        let expires = grant
            .expires
            .as_deref()
            .and_then(|raw| NaiveDateTime::parse_from_str(raw, EXPIRY_FORMAT).ok());
        Self {
            token: SecretString::from(grant.token),
            expires,
        }
    }

    /// Whether the token can still be used at `now`.
    pub fn is_valid_at(&self, now: NaiveDateTime) -> bool {
        self.expires.is_none_or(|expires| expires >= now)
    }
}

impl PhpIpamClient {
    /// Return a usable token, logging in first if there is none or the
    /// current one has expired.
    pub async fn ensure_authenticated(&self) -> Result<SecretString, Error> {
        let now = Utc::now().naive_utc();
        if let Some(state) = self.cached_token() {
            if state.is_valid_at(now) {
                return Ok(state.token);
            }
            debug!("phpIPAM token expired, re-authenticating");
        }

        let state = self.login().await?;
        let token = state.token.clone();
        *self.token_slot() = Some(state);
        Ok(token)
    }

    /// Authenticate with the configured user name and password.
    pub async fn login(&self) -> Result<TokenState, Error> {
        let url = self.url(&["user"])?;
        let (username, password) = self.credentials();
        debug!("logging in at {url}");

        let resp = send_with_retry(self.retry(), || {
            self.http()
                .post(url.clone())
                .basic_auth(username, Some(password))
        })
        .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if body.trim() == "Authentication failed" {
            return Err(Error::Authentication {
                message: format!("phpIPAM rejected the credentials (HTTP {status})"),
            });
        }

        let envelope = parse_envelope::<TokenGrant>(status, &body).map_err(|e| match e {
            Error::PhpIpam { code, message } => Error::Authentication {
                message: format!("failed to receive token from phpIPAM ({code}: {message})"),
            },
            other => other,
        })?;

        let grant = envelope.data.ok_or_else(|| Error::Authentication {
            message: "login succeeded but no token was returned".into(),
        })?;

        debug!("login successful");
        Ok(TokenState::from_grant(grant))
    }

    /// Forget the cached token so the next request logs in again.
    pub fn invalidate_token(&self) {
        *self.token_slot() = None;
    }

    fn cached_token(&self) -> Option<TokenState> {
        self.token_slot().clone()
    }

    /// The token slot. It is only ever replaced whole, so a poisoned lock
    /// still holds a consistent value.
    fn token_slot(&self) -> MutexGuard<'_, Option<TokenState>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::transport::RetryPolicy;

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, EXPIRY_FORMAT).unwrap()
    }

    #[test]
    fn token_valid_until_expiry() {
        let state = TokenState::from_grant(TokenGrant {
            token: "abc".into(),
            expires: Some("2017-07-09 20:05:28".into()),
        });
        assert!(state.is_valid_at(at("2017-07-09 20:05:28")));
        assert!(!state.is_valid_at(at("2017-07-09 20:05:29")));
    }

    #[test]
    fn token_without_expiry_never_expires() {
        let state = TokenState::from_grant(TokenGrant {
            token: "abc".into(),
            expires: None,
        });
        assert!(state.is_valid_at(at("2099-01-01 00:00:00")));
    }

    #[test]
    fn token_survives_poisoned_lock() {
        let client = PhpIpamClient::with_client(
            "https://ipam.example.com/api/migrator",
            reqwest::Client::new(),
            "admin",
            SecretString::from("pw".to_owned()),
            RetryPolicy::none(),
        )
        .unwrap();

        std::thread::scope(|scope| {
            let poisoner = scope.spawn(|| {
                let _slot = client.token.lock().unwrap();
                panic!("poison the token lock");
            });
            assert!(poisoner.join().is_err());
        });
        assert!(client.token.is_poisoned());

        *client.token_slot() = Some(TokenState::from_grant(TokenGrant {
            token: "abc".into(),
            expires: None,
        }));
        assert!(client.cached_token().is_some());

        client.invalidate_token();
        assert!(client.cached_token().is_none());
    }
}
