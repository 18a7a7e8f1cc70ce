use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::host::types::{GraphqlResponse, Scene};
use crate::plugin::ServerConnection;

/// Connection timeout for host API requests.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Scene fields the plugin needs: identity, external URLs, and the
/// technical metadata of every file variant.
const SCENE_FRAGMENT: &str = "
id
title
urls
files {
    path
    size
    duration
    width
    height
    frame_rate
    bit_rate
    video_codec
    mod_time
}
";

/// Client for the invoking Stash instance's GraphQL API.
pub struct HostClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    cookie: Option<String>,
}

impl HostClient {
    /// Build a client from the connection block of the plugin input.
    pub fn new(conn: &ServerConnection) -> Self {
        let client = reqwest::Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        let cookie = conn
            .session_cookie
            .as_ref()
            .map(|c| format!("{}={}", c.name, c.value));

        Self {
            client,
            url: conn.graphql_url(),
            api_key: conn.api_key.clone(),
            cookie,
        }
    }

    /// Find all scenes whose URL matches `url_regex`, in host order.
    ///
    /// Returns the total count alongside the scenes. A connection-level
    /// failure is [`Error::HostUnavailable`] and fatal to the run.
    pub async fn find_scenes_by_url(&self, url_regex: &str) -> Result<(u64, Vec<Scene>)> {
        let query = format!(
            "query FindScenes($filter: FindFilterType, $scene_filter: SceneFilterType) {{
                findScenes(filter: $filter, scene_filter: $scene_filter) {{
                    count
                    scenes {{ {SCENE_FRAGMENT} }}
                }}
            }}"
        );
        let body = json!({
            "query": query,
            "variables": {
                "filter": { "per_page": -1 },
                "scene_filter": {
                    "url": { "value": url_regex, "modifier": "MATCHES_REGEX" }
                }
            }
        });

        debug!(url = %self.url, "Querying host for matching scenes");

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.header("ApiKey", key);
        }
        if let Some(ref cookie) = self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::host_unavailable(format!("{}: {e}", self.url)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::host_unavailable(format!(
                "{} returned {status}",
                self.url
            )));
        }

        let parsed: GraphqlResponse = resp
            .json()
            .await
            .map_err(|e| Error::malformed(format!("findScenes response: {e}")))?;

        if let Some(errors) = parsed.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::http(format!(
                "findScenes query failed: {}",
                messages.join("; ")
            )));
        }

        let data = parsed
            .data
            .ok_or_else(|| Error::malformed("findScenes response missing data"))?;

        Ok((data.find_scenes.count, data.find_scenes.scenes))
    }
}
