use serde::{Deserialize, Serialize};

/// Default URL filter: the provider's known site family.
const DEFAULT_SCENE_URL_REGEX: &str = "howwomenorgasm\\.com|switch\\.com|getupclose\\.com|milfoverload\\.net|dareweshare\\.net|jerkbuddies\\.com|adulttime\\.studio|adulttime\\.com|oopsie\\.tube|adulttimepilots\\.com|kissmefuckme\\.net|youngerloverofmine\\.com";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scenes: SceneQueryConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

/// Which host records the run considers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneQueryConfig {
    /// Regex matched against scene URLs by the host query.
    #[serde(default = "default_scene_url_regex")]
    pub url_regex: String,
}

/// Where pattern data comes from and how scene URLs map to provider IDs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Pattern lookup endpoint; `videoId` and `pf` are appended as query
    /// parameters.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Platform name sent as the `pf` query parameter.
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Regex a scene URL must match to be considered a provider URL.
    #[serde(default = "default_url_match")]
    pub url_match: String,

    /// Regex whose first capture group is the numeric provider ID.
    #[serde(default = "default_id_pattern")]
    pub id_pattern: String,

    /// Pause after a rate-limit or security rejection on a cached entry,
    /// in seconds.
    #[serde(default = "default_rate_limit_pause")]
    pub rate_limit_pause_secs: u64,
}

/// Knobs for the exponential-backoff retry policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff unit in milliseconds; attempt n waits
    /// `base * 2^n` plus jitter.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_scene_url_regex() -> String {
    DEFAULT_SCENE_URL_REGEX.to_string()
}

fn default_endpoint() -> String {
    "https://coll.lovense.com/coll-log/video-websites/get/pattern".to_string()
}

fn default_platform() -> String {
    "Adulttime".to_string()
}

fn default_url_match() -> String {
    "\\.adulttime\\.com".to_string()
}

fn default_id_pattern() -> String {
    "/([0-9]+)".to_string()
}

fn default_rate_limit_pause() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for SceneQueryConfig {
    fn default() -> Self {
        Self {
            url_regex: default_scene_url_regex(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            platform: default_platform(),
            url_match: default_url_match(),
            id_pattern: default_id_pattern(),
            rate_limit_pause_secs: default_rate_limit_pause(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}
