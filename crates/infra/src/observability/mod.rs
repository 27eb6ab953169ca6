//! Tracing subscriber setup
//!
//! Consumers call [`init_tracing`] once at startup. `RUST_LOG` wins over the
//! configured filter when set.

use std::io::{self, IsTerminal};

use gamepanel_domain::{LoggingConfig, PanelError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber: `EnvFilter` plus human-readable or JSON
/// output on stderr.
///
/// # Errors
/// Returns `PanelError::Config` if the filter directive is invalid or a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = parse_filter(rust_log.as_deref(), &config.filter)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_writer(io::stderr)).try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(io::stderr).with_ansi(io::stderr().is_terminal()))
            .try_init()
    };

    installed
        .map_err(|e| PanelError::Config(format!("Failed to install tracing subscriber: {}", e)))
}

/// `rust_log` when present, otherwise the configured directive
fn parse_filter(rust_log: Option<&str>, fallback: &str) -> Result<EnvFilter> {
    let directive = rust_log.filter(|value| !value.trim().is_empty()).unwrap_or(fallback);

    EnvFilter::try_new(directive)
        .map_err(|e| PanelError::Config(format!("Invalid log filter '{}': {}", directive, e)))
}
