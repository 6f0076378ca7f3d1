//! # Monitor Configuration
//!
//! Provides the configuration object for the sharing monitor.
//!
//! ## Overview
//!
//! A [`MonitorConfig`] is constructed once at startup and passed by reference
//! into the auditor and the polling loop. It is built either through
//! [`MonitorConfig::builder`] (tests, embedding) or from environment
//! variables with [`MonitorConfig::from_env`]. Both paths end in
//! [`MonitorConfig::validate`], so an invalid setting fails fast at startup
//! with an actionable message.
//!
//! ## Environment Variables
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `DRIVE_GUARD_INTERVAL_SECS` | Seconds between polling cycles | `60` |
//! | `DRIVE_GUARD_FOLDER_ID` | Restrict detection to one folder | unset (all files) |
//! | `DRIVE_GUARD_CREDENTIALS_FILE` | OAuth client secrets downloaded from the console | `credentials.json` |
//! | `DRIVE_GUARD_TOKEN_FILE` | Persisted OAuth token | `token.json` |
//! | `DRIVE_GUARD_LOG_FORMAT` | `pretty`, `compact` or `json` | build dependent |
//! | `RUST_LOG` | Custom log filter directives | workspace crates at `info` |
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::MonitorConfig;
//! use std::time::Duration;
//!
//! let config = MonitorConfig::builder()
//!     .interval(Duration::from_secs(30))
//!     .folder_id("0AbCdEf")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.interval, Duration::from_secs(30));
//! ```

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LoggingConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Full read/write Drive scope; permission deletion requires it
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Default seconds between polling cycles
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Default look-back added on top of the interval (120 minutes)
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(120 * 60);

/// Longest accepted polling interval (24 hours)
const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

const ENV_INTERVAL: &str = "DRIVE_GUARD_INTERVAL_SECS";
const ENV_FOLDER_ID: &str = "DRIVE_GUARD_FOLDER_ID";
const ENV_CREDENTIALS_FILE: &str = "DRIVE_GUARD_CREDENTIALS_FILE";
const ENV_TOKEN_FILE: &str = "DRIVE_GUARD_TOKEN_FILE";
const ENV_LOG_FORMAT: &str = "DRIVE_GUARD_LOG_FORMAT";
const ENV_LOG_FILTER: &str = "RUST_LOG";

/// Configuration for the sharing monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Sleep between the end of one cycle and the start of the next
    pub interval: Duration,

    /// Fixed look-back added to the interval when computing the query window
    pub safety_margin: Duration,

    /// Optional folder restriction for the listing query
    pub folder_id: Option<String>,

    /// OAuth client secrets file (`installed` or `web` client)
    pub credentials_file: PathBuf,

    /// Persisted OAuth token file
    pub token_file: PathBuf,

    /// OAuth scopes requested for the credential
    pub scopes: Vec<String>,

    /// Log output settings
    pub logging: LoggingConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            safety_margin: DEFAULT_SAFETY_MARGIN,
            folder_id: None,
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
            scopes: vec![DRIVE_SCOPE.to_string()],
            logging: LoggingConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Creates a new builder for constructing a `MonitorConfig`.
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }

    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut builder = Self::builder();

        if let Some(raw) = get(ENV_INTERVAL) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_INTERVAL, raw
                ))
            })?;
            builder = builder.interval(Duration::from_secs(secs));
        }

        if let Some(folder_id) = get(ENV_FOLDER_ID) {
            builder = builder.folder_id(folder_id.trim());
        }

        if let Some(path) = get(ENV_CREDENTIALS_FILE) {
            builder = builder.credentials_file(path);
        }

        if let Some(path) = get(ENV_TOKEN_FILE) {
            builder = builder.token_file(path);
        }

        let mut logging = LoggingConfig::default();
        if let Some(format) = get(ENV_LOG_FORMAT) {
            logging = logging.with_format(format.parse::<LogFormat>()?);
        }
        if let Some(filter) = get(ENV_LOG_FILTER) {
            logging = logging.with_filter(filter);
        }

        builder.logging(logging).build()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Interval is greater than zero and at most 24 hours
    /// - Credential and token paths are not empty
    /// - Folder ID, when set, is non-empty and safe to embed in a query
    /// - At least one scope is requested
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::Config(
                "Polling interval must be greater than 0 seconds".to_string(),
            ));
        }

        if self.interval > MAX_INTERVAL {
            return Err(Error::Config(
                "Polling interval exceeds maximum of 24 hours".to_string(),
            ));
        }

        if self.credentials_file.as_os_str().is_empty() {
            return Err(Error::Config(
                "Credentials file path cannot be empty".to_string(),
            ));
        }

        if self.token_file.as_os_str().is_empty() {
            return Err(Error::Config("Token file path cannot be empty".to_string()));
        }

        if let Some(folder_id) = &self.folder_id {
            if folder_id.is_empty() {
                return Err(Error::Config("Folder ID cannot be empty".to_string()));
            }
            if folder_id.contains('\'') || folder_id.contains('\\') {
                return Err(Error::Config(format!(
                    "Folder ID '{}' contains characters not allowed in a Drive query",
                    folder_id
                )));
            }
        }

        if self.scopes.is_empty() {
            return Err(Error::Config(
                "At least one OAuth scope is required".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`MonitorConfig`] instances.
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    interval: Option<Duration>,
    safety_margin: Option<Duration>,
    folder_id: Option<String>,
    credentials_file: Option<PathBuf>,
    token_file: Option<PathBuf>,
    scopes: Option<Vec<String>>,
    logging: Option<LoggingConfig>,
}

impl MonitorConfigBuilder {
    /// Sets the polling interval (default 60 seconds).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the fixed look-back margin (default 120 minutes).
    pub fn safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = Some(margin);
        self
    }

    /// Restricts detection to direct children of a folder.
    pub fn folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    /// Sets the OAuth client secrets path.
    pub fn credentials_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Sets the persisted token path.
    pub fn token_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Overrides the requested OAuth scopes.
    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the final [`MonitorConfig`], validating every field.
    pub fn build(self) -> Result<MonitorConfig> {
        let defaults = MonitorConfig::default();

        let config = MonitorConfig {
            interval: self.interval.unwrap_or(defaults.interval),
            safety_margin: self.safety_margin.unwrap_or(defaults.safety_margin),
            folder_id: self.folder_id,
            credentials_file: self.credentials_file.unwrap_or(defaults.credentials_file),
            token_file: self.token_file.unwrap_or(defaults.token_file),
            scopes: self.scopes.unwrap_or(defaults.scopes),
            logging: self.logging.unwrap_or(defaults.logging),
        };

        config.validate()?;
        Ok(config)
    }
}
