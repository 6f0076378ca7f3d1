//! # Share Monitor
//!
//! Detects newly created Drive files and removes public link sharing from
//! them.
//!
//! ## Overview
//!
//! - [`poller::Poller`] runs the forever loop: compute a look-back
//!   [`window::TimeWindow`], list files created inside it, inspect each one.
//! - [`inspector::check_public_file`] deletes every `anyone` permission on a
//!   single file and reports what it did.
//! - [`auditor::report_default_sharing`] logs the account's default sharing
//!   entry once at startup.
//!
//! All provider access goes through [`bridge_traits::drive::DriveClient`], so
//! the loop is exercised in tests against scripted clients and a fixed clock.
//!
//! ## Usage
//!
//! ```ignore
//! use core_monitor::{report_default_sharing, Poller};
//!
//! report_default_sharing(client.as_ref()).await;
//! Poller::new(client, Arc::new(SystemClock), &config).run_forever().await;
//! ```

pub mod auditor;
pub mod error;
pub mod inspector;
pub mod poller;
pub mod window;

#[cfg(test)]
mod test_support;

pub use auditor::{report_default_sharing, SharingAudit};
pub use error::{MonitorError, Result};
pub use inspector::{check_public_file, FileOutcome, Remediation, Verdict};
pub use poller::{CycleReport, Poller};
pub use window::TimeWindow;
