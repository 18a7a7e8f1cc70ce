mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// File name looked for inside the plugin directory.
const CONFIG_FILE_NAME: &str = "stash-haptics.toml";

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load `stash-haptics.toml` from the plugin directory if present,
/// otherwise return the built-in defaults.
pub fn load_config_or_default(plugin_dir: &Path) -> Result<Config> {
    let path = plugin_dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return load_config(&path);
    }

    Ok(Config::default())
}

/// Validate configuration.
fn validate_config(config: &Config) -> Result<()> {
    if config.retry.max_attempts == 0 {
        anyhow::bail!("retry.max_attempts cannot be 0");
    }

    regex::Regex::new(&config.scenes.url_regex).context("Invalid scenes.url_regex")?;
    regex::Regex::new(&config.provider.url_match).context("Invalid provider.url_match")?;

    let id_pattern =
        regex::Regex::new(&config.provider.id_pattern).context("Invalid provider.id_pattern")?;
    if id_pattern.captures_len() < 2 {
        anyhow::bail!("provider.id_pattern must have a capture group for the ID");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        validate_config(&config).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(config.provider.platform, "Adulttime");
        assert_eq!(config.provider.rate_limit_pause_secs, 60);
        assert!(config.scenes.url_regex.contains("adulttime"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [retry]
            max_attempts = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert_eq!(
            config.provider.endpoint,
            "https://coll.lovense.com/coll-log/video-websites/get/pattern"
        );
    }

    #[test]
    fn rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_bad_regex() {
        let mut config = Config::default();
        config.scenes.url_regex = "[unclosed".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_id_pattern_without_group() {
        let mut config = Config::default();
        config.provider.id_pattern = "[0-9]+".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn load_config_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(dir.path()).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn load_config_or_default_with_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[provider]\nplatform = \"OtherSite\"\n",
        )
        .unwrap();
        let config = load_config_or_default(dir.path()).unwrap();
        assert_eq!(config.provider.platform, "OtherSite");
    }
}
