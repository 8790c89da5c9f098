//! Configuration loading and API key resolution
//!
//! Values come from three layers, highest priority first:
//! 1. Command-line flags (applied by each binary after loading)
//! 2. Environment variables
//! 3. TOML config file (`~/.config/phyto/config.toml` unless overridden)
//!
//! A missing default config file is not fatal: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "PHYTO_CONFIG";

/// Environment variables checked for the assistant API key, in priority order
pub const API_KEY_ENV_VARS: [&str; 2] = ["PHYTO_API_KEY", "OPENAI_API_KEY"];

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub assistant: AssistantConfig,
    pub taxonomy: TaxonomyConfig,
}

/// Logging section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Identification assistant section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    /// Service root, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Remote agent that answers identification requests
    pub assistant_id: Option<String>,
    /// API key (environment variables take priority)
    pub api_key: Option<String>,
    /// Delay between run status polls
    pub poll_interval_ms: u64,
    /// Upper bound on samples processed at once
    pub max_concurrent_samples: usize,
    /// Text sent alongside the uploaded photos
    pub instruction: String,
    /// Purpose attached to uploaded files
    pub upload_purpose: String,
    /// Photo file extension (matched case-insensitively)
    pub image_extension: String,
    /// Dataset folders that are never treated as samples
    pub skip_folders: Vec<String>,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            assistant_id: None,
            api_key: None,
            poll_interval_ms: 2000,
            max_concurrent_samples: 4,
            instruction: "Please identify this plant from these three photos.".to_string(),
            upload_purpose: "vision".to_string(),
            image_extension: "jpg".to_string(),
            skip_folders: vec!["answers".to_string()],
            request_timeout_secs: 60,
        }
    }
}

impl AssistantConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Taxonomy lookup section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Backbone service root, e.g. `https://api.gbif.org/v1`
    pub base_url: String,
    /// Kingdom every lookup is scoped to
    pub kingdom: String,
    /// Rank every lookup is scoped to
    pub rank: String,
    /// Minimum delay between consecutive lookups
    pub pacing_ms: u64,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gbif.org/v1".to_string(),
            kingdom: "Plantae".to_string(),
            rank: "species".to_string(),
            pacing_ms: 200,
            request_timeout_secs: 30,
        }
    }
}

impl TaxonomyConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl TomlConfig {
    /// Check values that serde cannot constrain
    pub fn validate(&self) -> Result<()> {
        if self.assistant.max_concurrent_samples == 0 {
            return Err(Error::Config(
                "assistant.max_concurrent_samples must be at least 1".to_string(),
            ));
        }
        if self.assistant.base_url.trim().is_empty() {
            return Err(Error::Config("assistant.base_url is empty".to_string()));
        }
        if self.taxonomy.base_url.trim().is_empty() {
            return Err(Error::Config("taxonomy.base_url is empty".to_string()));
        }
        Ok(())
    }
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("phyto").join("config.toml"))
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Write a TOML config file, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load configuration following the file resolution order
///
/// 1. `explicit` (from `--config`)
/// 2. `PHYTO_CONFIG` environment variable
/// 3. Platform default path
///
/// Files named by (1) or (2) must exist. The platform default may be absent,
/// in which case compiled defaults are returned.
pub fn load_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        info!("Loading config from {}", path.display());
        return read_toml_config(path);
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            info!("Loading config from {} ({})", path, CONFIG_PATH_ENV);
            return read_toml_config(Path::new(&path));
        }
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            read_toml_config(&path)
        }
        Some(path) => {
            warn!(
                "No config file at {}; using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            warn!("Could not determine config directory; using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve the assistant API key
///
/// **Priority:** `PHYTO_API_KEY` → `OPENAI_API_KEY` → TOML `assistant.api_key`
pub fn resolve_api_key(config: &AssistantConfig) -> Result<String> {
    let mut candidates: Vec<(&str, String)> = Vec::new();

    for var in API_KEY_ENV_VARS {
        if let Ok(key) = std::env::var(var) {
            if is_valid_key(&key) {
                candidates.push((var, key));
            }
        }
    }

    if let Some(key) = &config.api_key {
        if is_valid_key(key) {
            candidates.push(("TOML", key.clone()));
        }
    }

    if candidates.len() > 1 {
        let sources: Vec<&str> = candidates.iter().map(|(source, _)| *source).collect();
        warn!(
            "API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    match candidates.into_iter().next() {
        Some((source, key)) => {
            info!("API key loaded from {}", source);
            Ok(key.trim().to_string())
        }
        None => Err(Error::Config(
            "Assistant API key not configured. Set one of:\n\
             1. Environment: PHYTO_API_KEY=your-key (or OPENAI_API_KEY)\n\
             2. TOML config: [assistant] api_key = \"your-key\""
                .to_string(),
        )),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = TomlConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.assistant.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.assistant.max_concurrent_samples, 4);
        assert_eq!(config.assistant.skip_folders, vec!["answers".to_string()]);
        assert_eq!(config.taxonomy.pacing(), Duration::from_millis(200));
        assert_eq!(config.taxonomy.kingdom, "Plantae");
        assert_eq!(config.taxonomy.rank, "species");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [assistant]
            assistant_id = "asst_123"
            poll_interval_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.assistant.assistant_id.as_deref(), Some("asst_123"));
        assert_eq!(config.assistant.poll_interval_ms, 500);
        assert_eq!(config.assistant.upload_purpose, "vision");
        assert_eq!(config.taxonomy, TaxonomyConfig::default());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = TomlConfig::default();
        config.assistant.max_concurrent_samples = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("sk-abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   \t"));
    }
}
