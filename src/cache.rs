//! On-disk cache of provider responses, raw patterns, and converted scripts.
//!
//! One shared directory keyed by provider ID with three fixed suffixes:
//! `<id>.json` holds the verbatim lookup response, `<id>.pat` the verbatim
//! raw pattern payload, and `<id>.funscript` the converted script. Entries
//! are whole-file writes, immutable once written.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::convert::Funscript;
use crate::error::{Error, Result};
use crate::provider::{self, ProviderResponse};

/// Subdirectory of the plugin directory holding all cache entries.
const CACHE_DIR_NAME: &str = "cache";

const META_EXT: &str = "json";
const PATTERN_EXT: &str = "pat";
const SCRIPT_EXT: &str = "funscript";

/// Filesystem cache keyed by provider ID.
pub struct PatternCache {
    dir: PathBuf,
}

impl PatternCache {
    /// Create a cache rooted at `<plugin_dir>/cache`.
    pub fn new(plugin_dir: &Path) -> Self {
        Self {
            dir: plugin_dir.join(CACHE_DIR_NAME),
        }
    }

    /// Ensure the cache directory exists.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        debug!(dir = %self.dir.display(), "Cache directory ready");
        Ok(())
    }

    /// Path of the verbatim lookup response for `id`.
    pub fn meta_path(&self, id: &str) -> PathBuf {
        self.entry_path(id, META_EXT)
    }

    /// Path of the verbatim raw pattern payload for `id`.
    pub fn pattern_path(&self, id: &str) -> PathBuf {
        self.entry_path(id, PATTERN_EXT)
    }

    /// Path of the converted script for `id`.
    pub fn script_path(&self, id: &str) -> PathBuf {
        self.entry_path(id, SCRIPT_EXT)
    }

    pub fn has_meta(&self, id: &str) -> bool {
        self.meta_path(id).is_file()
    }

    pub fn has_pattern(&self, id: &str) -> bool {
        self.pattern_path(id).is_file()
    }

    pub fn has_script(&self, id: &str) -> bool {
        self.script_path(id).is_file()
    }

    /// Read and parse the cached lookup response.
    ///
    /// Distinguishes a missing entry ([`Error::NotFound`]) from a truncated
    /// or corrupt one ([`Error::MalformedPayload`], e.g. after a crash
    /// mid-write).
    pub fn read_meta(&self, id: &str) -> Result<ProviderResponse> {
        let raw = self.read_entry(&self.meta_path(id))?;
        provider::parse_response(&raw)
    }

    /// Persist the verbatim lookup response body.
    pub fn write_meta(&self, id: &str, raw: &str) -> Result<()> {
        std::fs::write(self.meta_path(id), raw)?;
        Ok(())
    }

    /// Delete the cached lookup response so the next run re-fetches it.
    pub fn invalidate_meta(&self, id: &str) -> Result<()> {
        let path = self.meta_path(id);
        if path.exists() {
            std::fs::remove_file(&path)?;
            info!(id = %id, "Invalidated cached provider response");
        }
        Ok(())
    }

    /// Read the cached raw pattern payload.
    pub fn read_pattern(&self, id: &str) -> Result<String> {
        self.read_entry(&self.pattern_path(id))
    }

    /// Persist the verbatim raw pattern payload.
    pub fn write_pattern(&self, id: &str, raw: &str) -> Result<()> {
        std::fs::write(self.pattern_path(id), raw)?;
        Ok(())
    }

    /// Serialize and persist a converted script, returning its path.
    pub fn write_script(&self, id: &str, script: &Funscript) -> Result<PathBuf> {
        let path = self.script_path(id);
        let encoded = serde_json::to_string(script)
            .map_err(|e| Error::malformed(format!("encoding funscript: {e}")))?;
        std::fs::write(&path, encoded)?;
        Ok(path)
    }

    fn entry_path(&self, id: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{id}.{ext}"))
    }

    fn read_entry(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(Error::not_found(path.display().to_string()));
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn cache() -> (tempfile::TempDir, PatternCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = PatternCache::new(dir.path());
        cache.ensure().unwrap();
        (dir, cache)
    }

    #[test]
    fn entry_paths_use_fixed_suffixes() {
        let cache = PatternCache::new(Path::new("/plugins/stash-haptics"));
        assert_eq!(
            cache.meta_path("123456"),
            PathBuf::from("/plugins/stash-haptics/cache/123456.json")
        );
        assert_eq!(
            cache.pattern_path("123456"),
            PathBuf::from("/plugins/stash-haptics/cache/123456.pat")
        );
        assert_eq!(
            cache.script_path("123456"),
            PathBuf::from("/plugins/stash-haptics/cache/123456.funscript")
        );
    }

    #[test]
    fn meta_roundtrip() {
        let (_dir, cache) = cache();
        assert!(!cache.has_meta("1"));

        cache
            .write_meta("1", r#"{"code": 0, "data": {"pattern": "https://x/p"}}"#)
            .unwrap();
        assert!(cache.has_meta("1"));

        let meta = cache.read_meta("1").unwrap();
        assert!(meta.has_pattern());
        assert_eq!(meta.pattern_url().unwrap(), "https://x/p");
    }

    #[test]
    fn missing_meta_is_not_found() {
        let (_dir, cache) = cache();
        assert_matches!(cache.read_meta("42"), Err(Error::NotFound(_)));
    }

    #[test]
    fn truncated_meta_is_malformed() {
        let (_dir, cache) = cache();
        cache.write_meta("42", r#"{"code": 0, "dat"#).unwrap();
        assert_matches!(cache.read_meta("42"), Err(Error::MalformedPayload(_)));
    }

    #[test]
    fn invalidate_removes_meta_only() {
        let (_dir, cache) = cache();
        cache.write_meta("7", r#"{"code": 0}"#).unwrap();
        cache.write_pattern("7", "[]").unwrap();

        cache.invalidate_meta("7").unwrap();
        assert!(!cache.has_meta("7"));
        assert!(cache.has_pattern("7"));

        // Idempotent on an absent entry.
        cache.invalidate_meta("7").unwrap();
    }

    #[test]
    fn pattern_roundtrip_is_verbatim() {
        let (_dir, cache) = cache();
        let raw = r#"[{"t":0,"v":0},{"t":1000,"v":8}]"#;
        cache.write_pattern("9", raw).unwrap();
        assert_eq!(cache.read_pattern("9").unwrap(), raw);
    }

    #[test]
    fn script_write_creates_parseable_file() {
        let (_dir, cache) = cache();
        let script = crate::convert::convert("Test", 2000, &[]);
        let path = cache.write_script("3", &script).unwrap();
        assert!(path.is_file());
        assert!(cache.has_script("3"));

        let raw = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], "1.0");
    }
}
