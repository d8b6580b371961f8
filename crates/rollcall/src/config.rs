//! Configuration management for rollcall.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. The
//! sheet endpoint URL is the one value that must survive restarts, so the
//! config file can also be written back by the `config` commands.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matcher::MatchPolicy;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "rollcall";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROLLCALL_`, with `__` between
///    section and key, e.g. `ROLLCALL_SYNC__ENDPOINT_URL`)
/// 2. TOML config file at `~/.config/rollcall/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sheet synchronization configuration.
    pub sync: SyncConfig,
    /// Capture configuration.
    pub capture: CaptureConfig,
    /// Insight endpoint configuration.
    pub insight: InsightConfig,
}

/// Sheet synchronization configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the spreadsheet web app.
    /// Unset selects local mode: no remote call is attempted anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// Capture-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Whether a code read on one scan path may match the other path's
    /// identifier field (NFC read matching `qrCode` and vice versa).
    pub cross_method_fallback: bool,
}

/// Insight endpoint configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// URL of the summarization endpoint.
    /// Unset means insight requests return the static fallback text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            cross_method_fallback: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `ROLLCALL_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ROLLCALL_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load only the defaults and the TOML file, skipping env overrides.
    ///
    /// The write-back commands go through this so a transient environment
    /// override never gets baked into the persisted file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_file_layer(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured endpoint URL does not parse as an
    /// http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.sync.endpoint_url {
            validate_endpoint_url(url)?;
        }
        if let Some(url) = &self.insight.endpoint_url {
            validate_endpoint_url(url)?;
        }
        Ok(())
    }

    /// Write the configuration to the given path as TOML.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let rendered = toml::to_string_pretty(self)?;
        std::fs::write(path, rendered).map_err(|source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// The configured sheet endpoint, if any.
    #[must_use]
    pub fn sync_endpoint(&self) -> Option<&str> {
        self.sync.endpoint_url.as_deref()
    }

    /// The configured insight endpoint, if any.
    #[must_use]
    pub fn insight_endpoint(&self) -> Option<&str> {
        self.insight.endpoint_url.as_deref()
    }

    /// The match policy selected by this configuration.
    #[must_use]
    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy::new(self.capture.cross_method_fallback)
    }
}

/// Check that a string parses as an http(s) URL.
///
/// # Errors
///
/// Returns an error if the URL does not parse or uses another scheme.
pub fn validate_endpoint_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|err| Error::invalid_endpoint(url, err.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::invalid_endpoint(
            url,
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rollcall_{tag}_{}.toml", std::process::id()))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.sync.endpoint_url.is_none());
        assert!(config.insight.endpoint_url.is_none());
        assert!(config.capture.cross_method_fallback);
    }

    #[test]
    fn test_match_policy_follows_capture_config() {
        let mut config = Config::default();
        assert!(config.match_policy().cross_method_fallback);

        config.capture.cross_method_fallback = false;
        assert!(!config.match_policy().cross_method_fallback);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.sync.endpoint_url = Some("https://script.google.com/macros/s/abc/exec".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_url() {
        let mut config = Config::default();
        config.sync.endpoint_url = Some("not a url".to_string());

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().is_invalid_endpoint());
    }

    #[test]
    fn test_validate_rejects_unsupported_scheme() {
        let mut config = Config::default();
        config.insight.endpoint_url = Some("ftp://example.com/exec".to_string());

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("scheme"));
    }

    #[test]
    fn test_validate_rejects_empty_string_endpoint() {
        // Unset is the explicit "no endpoint" state; an empty string is a
        // configuration mistake, not local mode.
        let mut config = Config::default();
        config.sync.endpoint_url = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_endpoint_url() {
        assert!(validate_endpoint_url("http://localhost:8080/exec").is_ok());
        assert!(validate_endpoint_url("https://script.google.com/macros/s/abc/exec").is_ok());
        assert!(validate_endpoint_url("file:///etc/passwd").is_err());
        assert!(validate_endpoint_url("exec").is_err());
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("rollcall"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_config_path("load");
        std::fs::write(
            &path,
            "[sync]\nendpoint_url = \"https://example.com/exec\"\n\n\
             [capture]\ncross_method_fallback = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.sync_endpoint(), Some("https://example.com/exec"));
        assert!(!config.capture.cross_method_fallback);
        assert!(config.insight_endpoint().is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_endpoint_in_file() {
        let path = temp_config_path("invalid");
        std::fs::write(&path, "[sync]\nendpoint_url = \"nope\"\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        assert!(result.is_err());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let path = temp_config_path("roundtrip");

        let mut config = Config::default();
        config.sync.endpoint_url = Some("https://example.com/exec".to_string());
        config.capture.cross_method_fallback = false;
        config.save_to(&path).unwrap();

        let reloaded = Config::load_file_layer(Some(path.clone())).unwrap();
        assert_eq!(reloaded, config);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_omits_unset_endpoints() {
        let path = temp_config_path("unset");

        Config::default().save_to(&path).unwrap();
        let rendered = std::fs::read_to_string(&path).unwrap();
        assert!(!rendered.contains("endpoint_url"));
        assert!(rendered.contains("cross_method_fallback"));

        let reloaded = Config::load_file_layer(Some(path.clone())).unwrap();
        assert!(reloaded.sync_endpoint().is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("rollcall_cfg_{}/nested", std::process::id()));
        let path = dir.join("config.toml");
        if let Some(root) = dir.parent() {
            let _ = std::fs::remove_dir_all(root);
        }

        Config::default().save_to(&path).unwrap();
        assert!(path.exists());

        if let Some(root) = dir.parent() {
            let _ = std::fs::remove_dir_all(root);
        }
    }

    #[test]
    fn test_sync_config_serialize() {
        let sync = SyncConfig {
            endpoint_url: Some("https://example.com/exec".to_string()),
        };
        let json = serde_json::to_string(&sync).unwrap();
        assert!(json.contains("endpoint_url"));
    }

    #[test]
    fn test_capture_config_deserialize() {
        let json = r#"{"cross_method_fallback": false}"#;
        let capture: CaptureConfig = serde_json::from_str(json).unwrap();
        assert!(!capture.cross_method_fallback);
    }
}
