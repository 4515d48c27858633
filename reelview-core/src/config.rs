//! Centralized configuration for Reelview.
//!
//! Defaults live here. A TOML file and `REELVIEW_*` environment variables
//! override them, in that order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::domain::IMAGE_BASE_URL;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Central configuration for all Reelview components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReelviewConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub controller: ControllerConfig,
}

/// Movie database API access.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Root every endpoint path is joined onto, with a trailing slash
    pub base_url: String,
    /// Prefix for poster and backdrop paths
    pub image_base_url: String,
    /// TMDB v3 key, sent as the `api_key` query parameter
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3/".to_string(),
            image_base_url: IMAGE_BASE_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(15),
            user_agent: concat!("reelview/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Response cache sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Entries kept per response kind before the least recent is evicted
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 256 }
    }
}

/// Screen controller tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Capacity of each controller's event queue
    pub command_buffer: usize,
    /// Quiet period after typing before a search is issued
    pub search_debounce: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            command_buffer: 100,
            search_debounce: Duration::from_millis(500),
        }
    }
}

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    cache: CacheSection,
    #[serde(default)]
    controller: ControllerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiSection {
    base_url: Option<String>,
    image_base_url: Option<String>,
    api_key: Option<String>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CacheSection {
    max_entries: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ControllerSection {
    command_buffer: Option<usize>,
    search_debounce_ms: Option<u64>,
}

impl ReelviewConfig {
    /// Returns the path to the default configuration file.
    ///
    /// Uses `~/.config/reelview/config.toml` on Unix, or the platform
    /// equivalent via `dirs::config_dir()`. Falls back to the current
    /// directory if no config dir is known.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("reelview").join("config.toml")
    }

    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Loads the config file at `path`, or the default path, then applies
    /// environment overrides and validates the result.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - `ConfigError::ReadError` - File exists but could not be read
    /// - `ConfigError::ParseError` - File is not valid TOML or has unknown keys
    /// - `ConfigError::ValidationError` - A value is out of range
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map_or_else(Self::config_path, Path::to_path_buf);

        let mut config = Self::from_file(&path)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates the config file alone, without environment
    /// overrides. A missing file yields the defaults.
    ///
    /// # Errors
    /// - `ConfigError::ReadError` - File exists but could not be read
    /// - `ConfigError::ParseError` - File is not valid TOML or has unknown keys
    /// - `ConfigError::ValidationError` - A value is out of range
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if !path.exists() {
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_file(file);
        tracing::debug!(path = %path.display(), "Loaded config file");

        config.validate()?;
        Ok(config)
    }

    /// Checks that the configured values are usable.
    ///
    /// # Errors
    /// - `ConfigError::ValidationError` - Base URL is not an absolute http(s) URL, or a size or timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::ValidationError { message });

        let base_url = Url::parse(&self.api.base_url).map_err(|e| ConfigError::ValidationError {
            message: format!("api.base_url '{}' is not a valid URL: {e}", self.api.base_url),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || !base_url.has_host() {
            return invalid(format!(
                "api.base_url '{}' must be an http(s) URL with a host",
                self.api.base_url
            ));
        }
        if self.api.request_timeout.is_zero() {
            return invalid("api.request_timeout_secs must be greater than zero".to_string());
        }
        if self.cache.max_entries == 0 {
            return invalid("cache.max_entries must be greater than zero".to_string());
        }
        if self.controller.command_buffer == 0 {
            return invalid("controller.command_buffer must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Creates a configuration for tests: no debounce, short timeout.
    pub fn for_testing() -> Self {
        Self {
            api: ApiConfig {
                api_key: Some("test-key".to_string()),
                request_timeout: Duration::from_secs(5),
                ..ApiConfig::default()
            },
            cache: CacheConfig::default(),
            controller: ControllerConfig {
                command_buffer: 16,
                search_debounce: Duration::ZERO,
            },
        }
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let ConfigFile {
            api,
            cache,
            controller,
        } = file;

        if let Some(base_url) = api.base_url {
            self.api.base_url = base_url;
        }
        if let Some(image_base_url) = api.image_base_url {
            self.api.image_base_url = image_base_url;
        }
        if api.api_key.is_some() {
            self.api.api_key = api.api_key;
        }
        if let Some(seconds) = api.request_timeout_secs {
            self.api.request_timeout = Duration::from_secs(seconds);
        }
        if let Some(user_agent) = api.user_agent {
            self.api.user_agent = user_agent;
        }
        if let Some(max_entries) = cache.max_entries {
            self.cache.max_entries = max_entries;
        }
        if let Some(command_buffer) = controller.command_buffer {
            self.controller.command_buffer = command_buffer;
        }
        if let Some(millis) = controller.search_debounce_ms {
            self.controller.search_debounce = Duration::from_millis(millis);
        }
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("REELVIEW_API_KEY") {
            if !key.trim().is_empty() {
                self.api.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(base_url) = std::env::var("REELVIEW_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("REELVIEW_REQUEST_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                self.api.request_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(entries) = std::env::var("REELVIEW_CACHE_ENTRIES") {
            if let Ok(count) = entries.parse::<usize>() {
                self.cache.max_entries = count;
            }
        }

        if let Ok(debounce) = std::env::var("REELVIEW_SEARCH_DEBOUNCE_MS") {
            if let Ok(millis) = debounce.parse::<u64>() {
                self.controller.search_debounce = Duration::from_millis(millis);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ReelviewConfig::default();

        assert_eq!(config.api.base_url, "https://api.themoviedb.org/3/");
        assert_eq!(config.api.image_base_url, "https://image.tmdb.org/t/p/w500");
        assert_eq!(config.api.api_key, None);
        assert_eq!(config.cache.max_entries, 256);
        assert_eq!(config.controller.command_buffer, 100);
        assert_eq!(
            config.controller.search_debounce,
            Duration::from_millis(500)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_preset() {
        let config = ReelviewConfig::for_testing();
        assert_eq!(config.controller.search_debounce, Duration::ZERO);
        assert!(config.api.api_key.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReelviewConfig::from_file(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.controller, ControllerConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nimage_base_url = \"https://img.example/w342\"\nrequest_timeout_secs = 3\n\n\
             [cache]\nmax_entries = 12\n\n[controller]\nsearch_debounce_ms = 250"
        )
        .unwrap();

        let config = ReelviewConfig::from_file(file.path()).unwrap();

        assert_eq!(config.api.image_base_url, "https://img.example/w342");
        assert_eq!(config.api.request_timeout, Duration::from_secs(3));
        assert_eq!(config.cache.max_entries, 12);
        assert_eq!(
            config.controller.search_debounce,
            Duration::from_millis(250)
        );
        assert_eq!(config.controller.command_buffer, 100);
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nmax_entires = 12").unwrap();

        let result = ReelviewConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_zero_cache_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nmax_entries = 0").unwrap();

        let result = ReelviewConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        let mut config = ReelviewConfig::default();
        config.api.base_url = "api.themoviedb.org/3/".to_string();

        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("api.base_url"));
    }

    #[test]
    fn test_base_url_without_host_is_rejected() {
        let mut config = ReelviewConfig::default();
        for base_url in ["http://", "ftp://files.example/3/", "https://"] {
            config.api.base_url = base_url.to_string();
            let error = config.validate().unwrap_err();
            assert!(
                error.to_string().contains("api.base_url"),
                "{base_url} accepted"
            );
        }

        config.api.base_url = "http://127.0.0.1:8080/3".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("REELVIEW_API_KEY", " abc123 ");
            std::env::set_var("REELVIEW_REQUEST_TIMEOUT", "60");
            std::env::set_var("REELVIEW_CACHE_ENTRIES", "32");
            std::env::set_var("REELVIEW_SEARCH_DEBOUNCE_MS", "nope");
        }

        let config = ReelviewConfig::from_env();

        assert_eq!(config.api.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.api.request_timeout, Duration::from_secs(60));
        assert_eq!(config.cache.max_entries, 32);
        assert_eq!(
            config.controller.search_debounce,
            Duration::from_millis(500)
        );

        // Cleanup
        unsafe {
            std::env::remove_var("REELVIEW_API_KEY");
            std::env::remove_var("REELVIEW_REQUEST_TIMEOUT");
            std::env::remove_var("REELVIEW_CACHE_ENTRIES");
            std::env::remove_var("REELVIEW_SEARCH_DEBOUNCE_MS");
        }
    }
}
