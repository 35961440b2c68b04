//! Configuration management for flightlookup.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "flightlookup";

/// Environment variable holding the provider access key.
pub const ACCESS_KEY_ENV: &str = "AVIATION_STACK_API_KEY";

/// Default provider endpoint.
pub const DEFAULT_UPSTREAM_URL: &str = "http://api.aviationstack.com/v1/flights";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables prefixed with `FLIGHTLOOKUP_` (nested with `__`)
/// 2. `AVIATION_STACK_API_KEY` for the provider access key
/// 3. TOML config file at `~/.config/flightlookup/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Upstream provider configuration.
    pub upstream: UpstreamConfig,
    /// Lookup client configuration.
    pub client: ClientConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the service listens on.
    pub addr: SocketAddr,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Upstream flight-data provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Provider flights endpoint.
    pub base_url: String,
    /// Provider access key. Absent means mock-only mode.
    pub access_key: Option<String>,
    /// Timeout for a single provider call in seconds.
    pub timeout_secs: u64,
    /// How long a provider answer is reused, in seconds. 0 disables reuse.
    pub cache_ttl_secs: u64,
    /// Serve the mock dataset when no access key is set.
    /// When false, lookups fail with a configuration error instead.
    pub mock_fallback: bool,
}

/// Lookup client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of a running flightlookup server.
    /// When unset, the client queries the services in-process.
    pub server_url: Option<String>,
    /// Quiet period before flight-number suggestions are fetched.
    pub flight_debounce_ms: u64,
    /// Quiet period before airport suggestions are fetched.
    pub airport_debounce_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            request_timeout_secs: 10,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            access_key: None,
            timeout_secs: 10,
            cache_ttl_secs: 60,
            mock_fallback: true,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            flight_debounce_ms: 500,
            airport_debounce_ms: 300,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
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
            .merge(
                Env::raw()
                    .only(&[ACCESS_KEY_ENV])
                    .map(|_| "upstream.access_key".into()),
            )
            .merge(Env::prefixed("FLIGHTLOOKUP_").split("__"));

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
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("server.request_timeout_secs", self.server.request_timeout_secs),
            ("upstream.timeout_secs", self.upstream.timeout_secs),
            ("client.flight_debounce_ms", self.client.flight_debounce_ms),
            ("client.airport_debounce_ms", self.client.airport_debounce_ms),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be greater than 0"),
                });
            }
        }

        validate_url("upstream.base_url", &self.upstream.base_url)?;
        if let Some(url) = &self.client.server_url {
            validate_url("client.server_url", url)?;
        }

        Ok(())
    }

    /// The configured provider access key, if it is present and not blank.
    #[must_use]
    pub fn access_key(&self) -> Option<&str> {
        self.upstream
            .access_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Copy of this configuration that is safe to print.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.upstream.access_key.is_some() {
            copy.upstream.access_key = Some("********".to_string());
        }
        copy
    }

    /// Get the server request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get the provider call timeout as a Duration.
    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }

    /// Get the provider answer reuse window as a Duration.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.upstream.cache_ttl_secs)
    }

    /// Get the flight-number suggestion debounce as a Duration.
    #[must_use]
    pub fn flight_debounce(&self) -> Duration {
        Duration::from_millis(self.client.flight_debounce_ms)
    }

    /// Get the airport suggestion debounce as a Duration.
    #[must_use]
    pub fn airport_debounce(&self) -> Duration {
        Duration::from_millis(self.client.airport_debounce_ms)
    }
}

fn validate_url(name: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::ConfigValidation {
            message: format!("{name} must be an http(s) URL, got {url:?}"),
        })
    }
}
