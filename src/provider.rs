//! Client for the haptic pattern provider API.
//!
//! A lookup call answers with a status code and, when the title has
//! interactive data, a URL to the raw pattern payload. Both responses are
//! kept verbatim for the cache; typed views are parsed on top.

use serde::Deserialize;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;

/// Parsed pattern lookup response. `code == 0` means a pattern exists.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderResponse {
    pub code: i64,
    #[serde(default)]
    pub data: Option<PatternData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatternData {
    /// URL of the raw pattern payload.
    pub pattern: String,
}

impl ProviderResponse {
    /// Whether the provider has interactive data for this title.
    pub fn has_pattern(&self) -> bool {
        self.code == 0
    }

    /// The pattern payload URL, present iff `code == 0`.
    pub fn pattern_url(&self) -> Result<&str> {
        self.data
            .as_ref()
            .map(|d| d.pattern.as_str())
            .ok_or_else(|| Error::malformed("provider response has code 0 but no pattern URL"))
    }
}

/// One sample of the raw haptic timeline: timestamp in milliseconds and an
/// intensity on the provider's 0–16 scale.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawPatternEvent {
    pub t: f64,
    pub v: f64,
}

/// Parse a raw pattern payload into its event sequence.
pub fn parse_events(raw: &str) -> Result<Vec<RawPatternEvent>> {
    serde_json::from_str(raw).map_err(|e| Error::malformed(format!("pattern payload: {e}")))
}

/// Parse a cached or freshly fetched lookup response.
pub fn parse_response(raw: &str) -> Result<ProviderResponse> {
    serde_json::from_str(raw).map_err(|e| Error::malformed(format!("provider response: {e}")))
}

/// HTTP client for the pattern provider, built on the retrying [`Fetcher`].
pub struct PatternProvider<'a> {
    fetcher: &'a Fetcher,
    endpoint: String,
    platform: String,
}

impl<'a> PatternProvider<'a> {
    pub fn new(fetcher: &'a Fetcher, config: &ProviderConfig) -> Self {
        Self {
            fetcher,
            endpoint: config.endpoint.clone(),
            platform: config.platform.clone(),
        }
    }

    /// Look up the pattern for a provider ID. Returns the verbatim body
    /// (for the cache) together with the parsed view.
    pub async fn fetch_meta(&self, id: &str) -> Result<(String, ProviderResponse)> {
        let url = format!("{}?videoId={}&pf={}", self.endpoint, id, self.platform);
        debug!(id = %id, url = %url, "Fetching pattern metadata");
        let raw = self.fetcher.get_text(&url).await?;
        let parsed = parse_response(&raw)?;
        Ok((raw, parsed))
    }

    /// Download the raw pattern payload, verbatim.
    pub async fn fetch_pattern(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching raw pattern payload");
        self.fetcher.get_text(url).await
    }
}
