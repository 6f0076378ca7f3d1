//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the sharing monitor:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other workspace crates and
//! the binary depend on. It establishes the logging conventions and the
//! startup configuration object.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{MonitorConfig, MonitorConfigBuilder};
pub use error::{Error, Result};
