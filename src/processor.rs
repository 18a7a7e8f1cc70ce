//! One sequential pass over all matching scenes.
//!
//! Per scene: cheap sibling-script check first, then provider ID
//! extraction, then the cache-miss or cache-hit path. Per-scene errors are
//! logged and skipped; only a host outage aborts the run.

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::associate;
use crate::cache::PatternCache;
use crate::config::Config;
use crate::convert;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, RetryPolicy};
use crate::host::{HostClient, Scene};
use crate::provider::{self, PatternProvider, ProviderResponse};

/// What one pass did.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    /// Matching scenes reported by the host.
    pub total: u64,
    /// Scenes for which a script was converted or re-associated.
    pub converted: usize,
    /// Scenes skipped because a sibling script already existed.
    pub skipped: usize,
    /// Scenes the provider has no interactive data for.
    pub no_pattern: usize,
    /// Scenes without a recognizable provider URL.
    pub no_provider_url: usize,
    /// Scenes that failed; the run continued past them.
    pub errors: usize,
}

enum Outcome {
    Converted,
    NoPattern,
    NoProviderUrl,
}

/// Drives the full download-and-convert pass.
pub struct Processor<'a> {
    config: &'a Config,
    host: HostClient,
    fetcher: Fetcher,
    cache: PatternCache,
    url_match: Regex,
    id_pattern: Regex,
    title_tag: Regex,
}

impl<'a> Processor<'a> {
    pub fn new(config: &'a Config, host: HostClient, cache: PatternCache) -> Result<Self> {
        let url_match = Regex::new(&config.provider.url_match)
            .map_err(|e| Error::malformed(format!("provider.url_match: {e}")))?;
        let id_pattern = Regex::new(&config.provider.id_pattern)
            .map_err(|e| Error::malformed(format!("provider.id_pattern: {e}")))?;

        Ok(Self {
            config,
            host,
            fetcher: Fetcher::new(RetryPolicy::from_config(&config.retry)),
            cache,
            url_match,
            id_pattern,
            title_tag: convert::title_tag_pattern(),
        })
    }

    /// Run one pass. `progress` is called with `processed / total` after
    /// each scene.
    pub async fn run<F: FnMut(f64)>(&self, mut progress: F) -> Result<RunSummary> {
        let (count, scenes) = self
            .host
            .find_scenes_by_url(&self.config.scenes.url_regex)
            .await?;
        info!(count, "Host returned matching scenes");

        let mut summary = RunSummary {
            total: count,
            ..RunSummary::default()
        };
        let denominator = count.max(1) as f64;

        for (i, scene) in scenes.iter().enumerate() {
            if associate::scene_has_script(scene) {
                info!(scene = %scene.id, "Scene already has a script file, skipping");
                summary.skipped += 1;
            } else {
                match self.process_scene(scene).await {
                    Ok(Outcome::Converted) => summary.converted += 1,
                    Ok(Outcome::NoPattern) => summary.no_pattern += 1,
                    Ok(Outcome::NoProviderUrl) => summary.no_provider_url += 1,
                    Err(e) => {
                        error!(scene = %scene.id, "Error processing scene: {e}");
                        summary.errors += 1;
                    }
                }
            }

            progress((i + 1) as f64 / denominator);
        }

        info!(
            converted = summary.converted,
            skipped = summary.skipped,
            no_pattern = summary.no_pattern,
            errors = summary.errors,
            "Pass complete"
        );
        Ok(summary)
    }

    /// First provider ID found among the scene's URLs.
    fn provider_id(&self, scene: &Scene) -> Option<String> {
        for url in &scene.urls {
            if !self.url_match.is_match(url) {
                continue;
            }
            if let Some(m) = self.id_pattern.captures(url).and_then(|c| c.get(1)) {
                let id = m.as_str().to_string();
                debug!(scene = %scene.id, url = %url, id = %id, "Found provider URL");
                return Some(id);
            }
        }
        None
    }

    async fn process_scene(&self, scene: &Scene) -> Result<Outcome> {
        let Some(id) = self.provider_id(scene) else {
            debug!(scene = %scene.id, "No provider URL on scene");
            return Ok(Outcome::NoProviderUrl);
        };

        let provider = PatternProvider::new(&self.fetcher, &self.config.provider);
        if self.cache.has_meta(&id) {
            self.process_cached(&provider, &id, scene).await
        } else {
            self.download_and_process(&provider, &id, scene).await
        }
    }

    /// Cache-miss path: fetch and persist the lookup response, then, when a
    /// pattern exists, fetch, convert, and associate it.
    async fn download_and_process(
        &self,
        provider: &PatternProvider<'_>,
        id: &str,
        scene: &Scene,
    ) -> Result<Outcome> {
        let (raw, meta) = provider.fetch_meta(id).await?;
        self.cache.write_meta(id, &raw)?;

        if !meta.has_pattern() {
            debug!(id = %id, "No interactive data for this ID");
            return Ok(Outcome::NoPattern);
        }

        let raw_pattern = provider.fetch_pattern(meta.pattern_url()?).await?;
        self.cache.write_pattern(id, &raw_pattern)?;

        let script = self.convert_and_store(id, scene, &raw_pattern)?;
        associate::associate(&script, scene)?;
        Ok(Outcome::Converted)
    }

    /// Cache-hit path: reuse the cached response, fetching and converting
    /// only what is missing, then associate.
    ///
    /// A rate-limit or security rejection here invalidates the cached
    /// response and pauses the run before surfacing, so the next run
    /// re-fetches cleanly.
    async fn process_cached(
        &self,
        provider: &PatternProvider<'_>,
        id: &str,
        scene: &Scene,
    ) -> Result<Outcome> {
        let meta = self.cache.read_meta(id)?;
        if !meta.has_pattern() {
            debug!(id = %id, "No interactive data for this ID (cached)");
            return Ok(Outcome::NoPattern);
        }
        info!(id = %id, "Reusing cached provider response");

        let result = self.resume_cached(provider, id, scene, &meta).await;
        if let Err(ref e) = result {
            if e.is_self_healing() {
                error!(id = %id, "Provider pushed back ({e}), invalidating cache and pausing");
                if let Err(inv) = self.cache.invalidate_meta(id) {
                    error!(id = %id, "Failed to invalidate cached response: {inv}");
                }
                let pause = Duration::from_secs(self.config.provider.rate_limit_pause_secs);
                tokio::time::sleep(pause).await;
            }
        }
        result
    }

    async fn resume_cached(
        &self,
        provider: &PatternProvider<'_>,
        id: &str,
        scene: &Scene,
        meta: &ProviderResponse,
    ) -> Result<Outcome> {
        let raw_pattern = if self.cache.has_pattern(id) {
            self.cache.read_pattern(id)?
        } else {
            let raw = provider.fetch_pattern(meta.pattern_url()?).await?;
            self.cache.write_pattern(id, &raw)?;
            raw
        };

        let script = if self.cache.has_script(id) {
            self.cache.script_path(id)
        } else {
            self.convert_and_store(id, scene, &raw_pattern)?
        };

        associate::associate(&script, scene)?;
        Ok(Outcome::Converted)
    }

    /// Convert a raw pattern payload and persist the script in the cache.
    fn convert_and_store(&self, id: &str, scene: &Scene, raw_pattern: &str) -> Result<PathBuf> {
        let events = provider::parse_events(raw_pattern)?;
        let duration_secs = scene.files.first().map(|f| f.duration).unwrap_or(0.0);
        let title = convert::clean_title(&scene.display_title(), &self.title_tag);

        let script = convert::convert(
            &title,
            convert::duration_ms_from_secs(duration_secs),
            &events,
        );
        self.cache.write_script(id, &script)
    }
}
