//! Configuration structures
//!
//! Loaded by `gamepanel_infra::config` from environment variables or a
//! JSON/TOML file. Every section except `api.base_url` has defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_ATTEMPTS, DEFAULT_REFRESH_LEEWAY_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, LOGIN_PATH, LOGOUT_PATH, ME_PATH, REFRESH_PATH,
};
use crate::errors::{PanelError, Result};

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Config pointing at `base_url` with every other setting defaulted
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig::new(base_url),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    /// Returns `PanelError::Config` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(PanelError::Config("api.base_url must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(PanelError::Config("api.timeout_secs must be greater than zero".into()));
        }
        if self.api.max_attempts == 0 {
            return Err(PanelError::Config("api.max_attempts must be at least 1".into()));
        }

        for (name, path) in [
            ("auth.login_path", &self.auth.login_path),
            ("auth.refresh_path", &self.auth.refresh_path),
            ("auth.logout_path", &self.auth.logout_path),
            ("auth.me_path", &self.auth.me_path),
        ] {
            if !path.starts_with('/') {
                return Err(PanelError::Config(format!("{name} must start with '/': {path}")));
            }
        }

        Ok(())
    }
}

/// REST API connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL including any path prefix (e.g. "https://panel.example.com/api")
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts per HTTP call for idempotent methods (initial try + retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            user_agent: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Identity service endpoints and session timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    #[serde(default = "default_me_path")]
    pub me_path: String,
    /// Refresh this many seconds before the declared expiry
    #[serde(default = "default_refresh_leeway_secs")]
    pub refresh_leeway_secs: u64,
}

impl AuthConfig {
    pub fn refresh_leeway(&self) -> Duration {
        Duration::from_secs(self.refresh_leeway_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            me_path: default_me_path(),
            refresh_leeway_secs: default_refresh_leeway_secs(),
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), json: false }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_login_path() -> String {
    LOGIN_PATH.to_string()
}

fn default_refresh_path() -> String {
    REFRESH_PATH.to_string()
}

fn default_logout_path() -> String {
    LOGOUT_PATH.to_string()
}

fn default_me_path() -> String {
    ME_PATH.to_string()
}

fn default_refresh_leeway_secs() -> u64 {
    DEFAULT_REFRESH_LEEWAY_SECS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
