//! Configuration management for Letterpress
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; a missing section takes its defaults. The
//! upstream credential is never stored in the file, it is read from the
//! process environment once at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// OpenRouter chat-completion API root
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model used for every generation
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

/// Output cap sent with every generation
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Environment variable holding the OpenRouter key
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Address to bind; `host` must be an IP literal
    pub fn socket_addr(&self) -> crate::error::AppResult<SocketAddr> {
        let ip = self.host.parse::<IpAddr>().map_err(|_| {
            crate::error::AppError::Config(format!(
                "server.host must be an IP address such as 0.0.0.0 or 127.0.0.1, got '{}'",
                self.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Upstream chat-completion API settings
///
/// Fields are private so a validated config cannot be altered afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
}

impl UpstreamConfig {
    /// Build an upstream config pointing at `base_url` with default model settings
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Name of the environment variable the credential is read from
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Full URL of the chat-completion endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Read the credential from the process environment
    pub fn resolve_api_key(&self) -> Option<ApiKey> {
        ApiKey::from_env_value(std::env::var(&self.api_key_env).ok())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Bearer credential for the upstream API
///
/// `Debug` prints only the length so the key never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Interpret a raw environment value; unset and empty both mean "no key"
    pub fn from_env_value(value: Option<String>) -> Option<Self> {
        value.filter(|v| !v.is_empty()).map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<{} chars>)", self.0.len())
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Load `path`, falling back to defaults when the default file is absent
    ///
    /// An explicitly chosen path must exist.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path = path.as_ref();
        if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using built-in defaults"
            );
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Validate configuration values
    pub fn validate(&self) -> crate::error::AppResult<()> {
        self.server.socket_addr()?;

        let upstream = &self.upstream;

        if !(upstream.base_url.starts_with("http://") || upstream.base_url.starts_with("https://"))
        {
            return Err(crate::error::AppError::Config(format!(
                "upstream.base_url must start with http:// or https://, got '{}'",
                upstream.base_url
            )));
        }

        if upstream.model.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "upstream.model cannot be empty".to_string(),
            ));
        }

        if upstream.max_tokens == 0 {
            return Err(crate::error::AppError::Config(
                "upstream.max_tokens must be greater than 0".to_string(),
            ));
        }

        if upstream.api_key_env.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "upstream.api_key_env cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
