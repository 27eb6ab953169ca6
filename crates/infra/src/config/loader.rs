//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file from the working directory, if present
//! 2. Attempts to load from environment variables
//! 3. If `GAMEPANEL_API_URL` is missing, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! ## Environment Variables
//! - `GAMEPANEL_API_URL`: Base URL of the panel API (required)
//! - `GAMEPANEL_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `GAMEPANEL_API_MAX_ATTEMPTS`: Attempts for idempotent calls
//! - `GAMEPANEL_USER_AGENT`: Override the `User-Agent` header
//! - `GAMEPANEL_REFRESH_LEEWAY_SECS`: Refresh this long before expiry
//! - `GAMEPANEL_LOG_FILTER`: Default `EnvFilter` directive
//! - `GAMEPANEL_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./gamepanel.json` or `./gamepanel.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use gamepanel_domain::{Config, PanelError, Result};
use url::Url;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["gamepanel.json", "gamepanel.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables (after reading `.env`).
/// If that fails, falls back to a config file.
///
/// # Errors
/// Returns `PanelError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Validation fails
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `GAMEPANEL_API_URL` is required; everything else falls back to the
/// defaults in [`Config::with_base_url`].
///
/// # Errors
/// Returns `PanelError::Config` if the URL is missing, a value does not
/// parse, or the result fails validation.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::with_base_url(env_var("GAMEPANEL_API_URL")?);

    if let Some(timeout) = env_parse::<u64>("GAMEPANEL_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("GAMEPANEL_API_MAX_ATTEMPTS")? {
        config.api.max_attempts = attempts;
    }
    config.api.user_agent = std::env::var("GAMEPANEL_USER_AGENT").ok();

    if let Some(leeway) = env_parse::<u64>("GAMEPANEL_REFRESH_LEEWAY_SECS")? {
        config.auth.refresh_leeway_secs = leeway;
    }

    if let Ok(filter) = std::env::var("GAMEPANEL_LOG_FILTER") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("GAMEPANEL_LOG_JSON", false);

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports JSON and
/// TOML (detected by file extension).
///
/// # Errors
/// Returns `PanelError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PanelError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PanelError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PanelError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Check that `base_url` is an absolute http(s) URL
///
/// # Errors
/// Returns `PanelError::Config` naming the offending value.
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url)
        .map_err(|e| PanelError::Config(format!("Invalid api.base_url '{}': {}", base_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(PanelError::Config(format!(
            "api.base_url must use http or https, got '{}'",
            other
        ))),
    }
}

fn validate(config: &Config) -> Result<()> {
    config.validate()?;
    validate_base_url(&config.api.base_url)
}

/// Parse configuration from string content, format chosen by extension
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PanelError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PanelError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(PanelError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| PanelError::Config(format!("Missing required environment variable: {}", key)))
}

/// Parse an optional environment variable. Unset is `Ok(None)`.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PanelError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
