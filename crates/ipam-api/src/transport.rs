// Shared transport configuration for building reqwest::Client instances.
//
// Both the NetBox and phpIPAM clients share TLS, timeout and retry
// settings through this module, avoiding duplicated builder logic.

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use crate::error::{Error, is_transient_status};

/// TLS verification mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Accept any certificate (self-signed IPAM servers).
    DangerAcceptInvalid,
}

/// Bounded exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each one after.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the given default headers.
    ///
    /// NetBox passes its `Authorization` header here; phpIPAM passes an
    /// empty map because its token changes over the client's lifetime.
    pub fn build_client(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .user_agent(concat!("ipam-migrator/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Send a request, retrying transient failures according to `policy`.
///
/// `request` is invoked once per attempt because a sent `RequestBuilder`
/// is consumed. Responses with a transient status (5xx, 429) are retried
/// while attempts remain; the last such response is returned to the caller
/// as-is so it can be mapped to a protocol-specific error.
pub(crate) async fn send_with_retry<F>(
    policy: &RetryPolicy,
    request: F,
) -> Result<reqwest::Response, Error>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let outcome = request().send().await;
        let retryable = match &outcome {
            Ok(resp) => is_transient_status(resp.status().as_u16()),
            Err(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        };

        if !retryable || attempt >= max_attempts {
            return outcome.map_err(Error::Transport);
        }

        let delay = policy.delay_after(attempt);
        match &outcome {
            Ok(resp) => warn!(
                status = resp.status().as_u16(),
                attempt,
                "transient HTTP status, retrying in {delay:?}"
            ),
            Err(e) => warn!(attempt, "transport failure ({e}), retrying in {delay:?}"),
        }
        tokio::time::sleep(delay).await;
        attempt += 1;
        debug!(attempt, "retrying request");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 6,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(2),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_secs(1));
        assert_eq!(policy.delay_after(3), Duration::from_secs(2));
        assert_eq!(policy.delay_after(5), Duration::from_secs(2));
    }

    #[test]
    fn none_means_single_attempt() {
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
