//! HTTP GET with bounded exponential-backoff retry.
//!
//! One [`RetryPolicy`] value drives both the provider metadata call and the
//! raw pattern download: up to `max_attempts` tries, sleeping
//! `base * 2^attempt + jitter` between them, retrying only on transport
//! errors and a fixed set of transient statuses.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{Error, Result};

/// Request timeout applied to every attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Statuses worth retrying; everything else fails immediately.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry policy consumed by [`Fetcher`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base unit of the exponential backoff.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Build a policy from the retry section of the config file.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Whether a response status is worth another attempt.
    pub fn is_retryable(&self, status: StatusCode) -> bool {
        RETRYABLE_STATUSES.contains(&status.as_u16())
    }

    /// Backoff before retry number `attempt` (0-based): `base * 2^attempt`
    /// plus up to one extra base unit of random jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay * 2u32.saturating_pow(attempt);
        backoff + self.base_delay.mul_f64(rand::random::<f64>())
    }
}

/// HTTP client wrapper that applies a [`RetryPolicy`] to GET requests.
pub struct Fetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Create a fetcher with the given policy.
    pub fn new(policy: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        Self { client, policy }
    }

    /// GET `url`, retrying per the policy. Returns the successful response,
    /// or the final failure once the budget is exhausted. A final 429 maps
    /// to [`Error::RateLimited`], a 403 to [`Error::SecurityRejected`].
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            let err = match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let err = status_error(url, status);
                    if !self.policy.is_retryable(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) => Error::http(format!("GET {url}: {e}")),
            };

            attempt += 1;
            if attempt >= self.policy.max_attempts {
                warn!(url = %url, attempts = attempt, "Retry budget exhausted");
                return Err(err);
            }

            let wait = self.policy.delay(attempt - 1);
            warn!(
                url = %url,
                attempt = attempt,
                max = self.policy.max_attempts,
                "Request failed ({}), retrying in {:.2}s",
                err,
                wait.as_secs_f64()
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// GET `url` and return the response body as text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.get(url).await?;
        resp.text()
            .await
            .map_err(|e| Error::http(format!("reading body of {url}: {e}")))
    }
}

fn status_error(url: &str, status: StatusCode) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            Error::RateLimited(format!("GET {url} returned {status}"))
        }
        StatusCode::FORBIDDEN => {
            Error::SecurityRejected(format!("GET {url} returned {status}"))
        }
        _ => Error::http(format!("GET {url} returned {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        let policy = RetryPolicy::default();
        for code in [429u16, 500, 502, 503, 504] {
            assert!(policy.is_retryable(StatusCode::from_u16(code).unwrap()));
        }
        for code in [200u16, 301, 400, 401, 403, 404] {
            assert!(!policy.is_retryable(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn delay_grows_exponentially_with_jitter() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
        };
        for attempt in 0..4 {
            let base = Duration::from_millis(100 * 2u64.pow(attempt));
            let d = policy.delay(attempt);
            assert!(d >= base, "attempt {attempt}: {d:?} < {base:?}");
            assert!(
                d <= base + Duration::from_millis(100),
                "attempt {attempt}: {d:?} jitter out of range"
            );
        }
    }

    #[test]
    fn policy_from_config_clamps_attempts() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 0,
            base_delay_ms: 250,
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn status_error_kinds() {
        let err = status_error("http://x", StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(err, Error::RateLimited(_)));

        let err = status_error("http://x", StatusCode::FORBIDDEN);
        assert!(matches!(err, Error::SecurityRejected(_)));

        let err = status_error("http://x", StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, Error::Http(_)));
    }
}
