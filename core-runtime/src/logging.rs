//! # Logging & Tracing Infrastructure
//!
//! Structured logging with the `tracing` crate:
//! - Pretty, compact, and JSON output formats
//! - Module-level filtering (`RUST_LOG` style directives)
//! - PII redaction helpers for tokens and email addresses
//!
//! ## Overview
//!
//! Every event goes to stdout prefixed with a second-precision UTC timestamp
//! (`2023-02-16T10:00:00Z`), so detection and remediation messages form a
//! line-oriented audit trail that can be grepped or shipped as JSON.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{LoggingConfig, LogFormat, init_logging};
//! use bridge_traits::time::LogLevel;
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_level(LogLevel::Debug);
//!
//! init_logging(config)?;
//! tracing::info!("Monitor started");
//! ```

use crate::error::{Error, Result};
use bridge_traits::time::LogLevel;
use std::io;
use std::str::FromStr;
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, format, time::ChronoUtc};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Workspace crates that log at the configured level by default
const WORKSPACE_TARGETS: &[&str] = &[
    "drive_share_guard",
    "core_runtime",
    "core_auth",
    "core_monitor",
    "provider_google_drive",
    "bridge_desktop",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Field name fragments whose values are never logged
const SECRET_FIELDS: &[&str] = &[
    "token",
    "secret",
    "authorization",
    "bearer",
    "code",
    "verifier",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored, for a terminal
    Pretty,
    /// One JSON object per event
    Json,
    /// Single-line text
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(Error::Config(format!(
                "Unknown log format '{}', expected pretty, json or compact",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level applied to the workspace crates when no filter is given
    pub level: LogLevel,
    /// Full `EnvFilter` directive string, e.g. `core_monitor=trace,warn`
    pub filter: Option<String>,
    /// Include the event target (module path)
    pub display_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            display_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }
}

type StdoutLayer<S> =
    fmt::Layer<S, format::DefaultFields, format::Format<format::Full, ChronoUtc>, fn() -> io::Stdout>;

fn stdout_layer<S>(config: &LoggingConfig) -> StdoutLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(config.display_target)
        .with_writer(io::stdout as fn() -> io::Stdout)
}

/// Install the global subscriber.
///
/// Call once at startup.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the filter string
/// does not parse.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry.with(stdout_layer(&config).pretty()).try_init(),
        LogFormat::Compact => registry.with(stdout_layer(&config).compact()).try_init(),
        LogFormat::Json => registry
            .with(
                stdout_layer(&config)
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = match &config.filter {
        Some(custom) => custom.clone(),
        None => {
            let level = config.level.as_str();
            WORKSPACE_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, level))
                .chain(std::iter::once("warn".to_string()))
                .collect::<Vec<_>>()
                .join(",")
        }
    };

    EnvFilter::try_new(directives).map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

/// Mask a value before it is recorded as a log field.
///
/// Credentials are replaced outright based on the field name; anything that
/// looks like an email address keeps only its first character.
///
/// ```ignore
/// use tracing::info;
/// use core_runtime::logging::redact_if_sensitive;
///
/// info!(email = %redact_if_sensitive("email", "owner@example.com"), "Default sharing settings");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    let field = field_name.to_lowercase();
    if SECRET_FIELDS.iter().any(|fragment| field.contains(fragment)) {
        return "[REDACTED]".to_string();
    }

    match value.split_once('@') {
        Some((local, domain)) if domain.contains('.') => match local.chars().next() {
            Some(first) => format!("{}***@[REDACTED]", first),
            None => "***@[REDACTED]".to_string(),
        },
        _ => value.to_string(),
    }
}
