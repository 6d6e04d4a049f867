//! Backend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Base URL of the shop backend gateway
//!
//! ## Optional
//! - `BACKEND_TOKEN` - Bearer token sent with every call
//! - `BACKEND_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BACKEND_RECONNECT_SECS` - Delay between connection attempts (default: 5)
//!
//! ## Error tracking (shared by both servers)
//! - `SENTRY_DSN` - Sentry DSN; tracking is disabled when unset
//! - `SENTRY_ENVIRONMENT` - Environment tag (e.g. production)
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//!
//! The environment helpers are shared with the storefront and admin
//! configuration loaders.

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RECONNECT_SECS: u64 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Settings for reaching the shop backend.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct BackendConfig {
    /// Gateway base URL, without trailing slash
    pub url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Delay between connection attempts at startup
    pub reconnect_interval: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("reconnect_interval", &self.reconnect_interval)
            .finish()
    }
}

impl BackendConfig {
    /// Load backend configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `BACKEND_URL` is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = parse_url("BACKEND_URL", &get_required_env("BACKEND_URL")?)?;
        let token = get_optional_env("BACKEND_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        let timeout = Duration::from_secs(get_parsed_env_or_default(
            "BACKEND_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let reconnect_interval = Duration::from_secs(get_parsed_env_or_default(
            "BACKEND_RECONNECT_SECS",
            DEFAULT_RECONNECT_SECS,
        )?);

        Ok(Self {
            url,
            token,
            timeout,
            reconnect_interval,
        })
    }

    /// Configuration pointing at `url` with default timeouts and no token.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute http(s) URL.
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_url("BACKEND_URL", url)?,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reconnect_interval: Duration::from_secs(DEFAULT_RECONNECT_SECS),
        })
    }

    /// Full URL for a backend path such as `call/getAllProducts`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.url.as_str().trim_end_matches('/'))
    }
}

/// Sentry error tracking settings.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl SentryConfig {
    /// Load Sentry settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a sample rate is not a number in `0.0..=1.0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty()),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }
}

fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let rate = get_parsed_env_or_default(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("sample rate must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Get a required environment variable.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] if the variable is unset.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] if the value is set but does not parse.
pub fn get_parsed_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
