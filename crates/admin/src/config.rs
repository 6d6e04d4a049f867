//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL of the admin panel; `https://` enables
//!   secure session cookies
//! - `ADMIN_PASSWORD` - Password for the admin gate (non-empty)
//! - `BACKEND_URL` - Shop backend gateway (see [`BackendConfig`])
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `LOG_FORMAT` - `json` for structured logs (default: text)
//! - `BACKEND_TOKEN`, `BACKEND_TIMEOUT_SECS`, `BACKEND_RECONNECT_SECS`
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};

use knots_folds_client::config::{get_env_or_default, get_required_env};
use knots_folds_client::{BackendConfig, ConfigError, SentryConfig};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Admin application configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: Url,
    /// Password checked by the admin gate
    pub password: SecretString,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Shop backend connection settings
    pub backend: BackendConfig,
    /// Error tracking
    pub sentry: SentryConfig,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url.as_str())
            .field("password", &"[REDACTED]")
            .field("json_logs", &self.json_logs)
            .field("backend", &self.backend)
            .field("sentry", &self.sentry)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = Url::parse(&get_required_env("ADMIN_BASE_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_BASE_URL".to_string(), e.to_string()))?;
        let password = validate_password(get_required_env("ADMIN_PASSWORD")?)?;
        let json_logs = get_env_or_default("LOG_FORMAT", "text").eq_ignore_ascii_case("json");

        Ok(Self {
            host,
            port,
            base_url,
            password,
            json_logs,
            backend: BackendConfig::from_env()?,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Local configuration for tests and development.
    ///
    /// # Errors
    ///
    /// Returns an error if `backend_url` is not an http(s) URL or the
    /// password is blank.
    pub fn local(backend_url: &str, password: &str) -> Result<Self, ConfigError> {
        let port = 3001;
        let base_url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_BASE_URL".into(), e.to_string()))?;
        Ok(Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port,
            base_url,
            password: validate_password(password.to_string())?,
            json_logs: false,
            backend: BackendConfig::new(backend_url)?,
            sentry: SentryConfig::default(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the panel is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// Whether `candidate` matches the configured password.
    ///
    /// Blank input never matches. The comparison time does not depend on
    /// where the first mismatch is.
    #[must_use]
    pub fn password_matches(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        constant_time_eq(
            candidate.as_bytes(),
            self.password.expose_secret().as_bytes(),
        )
    }
}

fn validate_password(password: String) -> Result<SecretString, ConfigError> {
    if password.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "ADMIN_PASSWORD".to_string(),
            "must not be empty".to_string(),
        ));
    }
    Ok(SecretString::from(password))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> AdminConfig {
        AdminConfig::local("http://127.0.0.1:8000", "woolly-mammoth").unwrap()
    }

    #[test]
    fn test_password_matches() {
        let config = config();
        assert!(config.password_matches("woolly-mammoth"));
        assert!(!config.password_matches("woolly-mammotH"));
        assert!(!config.password_matches("woolly"));
        assert!(!config.password_matches(""));
    }

    #[test]
    fn test_blank_password_rejected() {
        assert!(matches!(
            AdminConfig::local("http://127.0.0.1:8000", "   "),
            Err(ConfigError::InvalidEnvVar(..))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", config());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("woolly-mammoth"));
    }

    #[test]
    fn test_secure_cookies_follow_scheme() {
        let mut config = config();
        assert!(!config.is_secure());
        config.base_url = Url::parse("https://admin.knotsandfolds.in").unwrap();
        assert!(config.is_secure());
    }
}
