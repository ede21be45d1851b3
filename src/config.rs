//! Configuration management for the Web File Manager
//!
//! Values are layered from built-in defaults, an optional `config.toml`,
//! `WFM_` prefixed environment variables and finally the bare `PORT`
//! variable used by most hosting platforms.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: i64 = 5000;
const DEFAULT_STORAGE_ROOT: &str = "storage";
const DEFAULT_SESSION_TTL_DAYS: i64 = 30;
const DEFAULT_SESSION_COOKIE: &str = "wfm_session";

const DEFAULT_SESSION_BACKEND: &str = "file";

const SECONDS_PER_DAY: u64 = 86_400;

/// Where session records are kept
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// JSON files under `<storage_root>/.sessions`, surviving restarts
    File,
    /// Process memory, lost on restart
    Memory,
}

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the HTTP listener binds to
    pub bind_address: String,

    /// Listening port. Environment: PORT or WFM_PORT
    pub port: u16,

    /// Base directory holding one `user_<id>` folder per client
    pub storage_root: String,

    /// Lifetime of a browser session, refreshed on every write
    pub session_ttl_days: u64,

    /// Name of the cookie carrying the session key
    pub session_cookie: String,

    /// Backing store for session records
    pub session_backend: SessionBackend,

    /// Reject client paths that resolve outside the client's storage root
    pub confine_paths: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT as u16,
            storage_root: DEFAULT_STORAGE_ROOT.to_string(),
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS as u64,
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            session_backend: SessionBackend::File,
            confine_paths: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` (optional) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config", std::env::var("PORT").ok())
    }

    /// Load configuration from the given file stem, applying `port_override` last
    pub fn load_from(config_path: &str, port_override: Option<String>) -> Result<Self, ConfigError> {
        let port_override = match port_override {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                ConfigError::Message(format!("PORT must be a number, got {raw:?}"))
            })?),
            None => None,
        };

        let settings = Self::defaults()?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("WFM").try_parsing(true))
            .set_override_option("port", port_override)?
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", DEFAULT_PORT)?
            .set_default("storage_root", DEFAULT_STORAGE_ROOT)?
            .set_default("session_ttl_days", DEFAULT_SESSION_TTL_DAYS)?
            .set_default("session_cookie", DEFAULT_SESSION_COOKIE)?
            .set_default("session_backend", DEFAULT_SESSION_BACKEND)?
            .set_default("confine_paths", false)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.session_ttl_days == 0 {
            return Err(ConfigError::Message(
                "session_ttl_days must be greater than 0".into(),
            ));
        }

        let ttl_secs = self
            .session_ttl_days
            .checked_mul(SECONDS_PER_DAY)
            .filter(|secs| i64::try_from(*secs).is_ok());
        if ttl_secs.is_none() {
            return Err(ConfigError::Message(format!(
                "session_ttl_days {} is too large",
                self.session_ttl_days
            )));
        }

        if self.session_cookie.is_empty()
            || !self
                .session_cookie
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Message(format!(
                "session_cookie {:?} is not a valid cookie name",
                self.session_cookie
            )));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Session lifetime as Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_days.saturating_mul(SECONDS_PER_DAY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.listen_socket(), "0.0.0.0:5000");
        assert_eq!(config.session_ttl(), Duration::from_secs(30 * 86_400));
        assert!(!config.confine_paths);
        assert_eq!(config.session_backend, SessionBackend::File);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn port_override_wins_over_defaults() {
        let config = ServerConfig::load_from("does-not-exist", Some("8080".into())).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage_root, "storage");
        assert_eq!(config.session_backend, SessionBackend::File);
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let result = ServerConfig::load_from("does-not-exist", Some("eighty".into()));
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_port = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(zero_port.validate().is_err());

        let empty_root = ServerConfig {
            storage_root: "  ".into(),
            ..ServerConfig::default()
        };
        assert!(empty_root.validate().is_err());

        let no_ttl = ServerConfig {
            session_ttl_days: 0,
            ..ServerConfig::default()
        };
        assert!(no_ttl.validate().is_err());

        let huge_ttl = ServerConfig {
            session_ttl_days: u64::MAX / 2,
            ..ServerConfig::default()
        };
        assert!(huge_ttl.validate().is_err());

        let bad_cookie = ServerConfig {
            session_cookie: "a b;c".into(),
            ..ServerConfig::default()
        };
        assert!(bad_cookie.validate().is_err());
    }
}
