//! # Screenshot Events
//!
//! An event-driven layer over a remote screenshot API. Providers create
//! screenshots asynchronously: a job is queued, processed, and eventually
//! finishes or fails. This crate submits jobs, polls their status at a fixed
//! interval and turns every observed transition into a [`Notification`] on a
//! [`NotificationStream`].
//!
//! ## Notifications
//!
//! | Name | Payload | When |
//! |------|---------|------|
//! | provider status (`in_queue`, `processing`, ...) | job record | every non-terminal response |
//! | `finished` | job record | the job finished |
//! | `failed` | job record | the provider reported `error` |
//! | `timeout` | record, or all records of a batch | the session timeout elapsed |
//! | `complete` | all records of a batch | every job of a batch finished or failed |
//!
//! Each session delivers exactly one terminal notification (`finished`,
//! `failed` or `timeout` for a single job; `complete` or `timeout` for a
//! batch) and the stream ends right after it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use screenshot_events::{JobRequest, ScreenshotApi, ScreenshotEvents, SettingsUpdate};
//! use std::sync::Arc;
//!
//! async fn run(api: Arc<dyn ScreenshotApi>) -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ScreenshotEvents::new(api);
//!     client.set_defaults(SettingsUpdate { timeout: Some(120.0), interval: Some(2.0) })?;
//!
//!     let requests = vec![
//!         JobRequest::new("https://example.com"),
//!         JobRequest::new("https://example.org").with_details(2),
//!     ];
//!     let mut events = client.create_multiple(requests, JobRequest::default().with_option("instance_id", 12))?;
//!
//!     while let Some(notification) = events.next().await {
//!         println!("{}", notification.name());
//!     }
//!     Ok(())
//! }
//! ```

/// Remote screenshot API seam
pub mod api;

/// Batch tracking across many jobs
pub mod batch;

/// Client entry point
pub mod client;

/// Polling defaults and request types
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// Logging setup
pub mod logging;

/// Tracker activity metrics
pub mod metrics;

/// Lifecycle notifications and their stream
pub mod notification;

/// Provider job records
pub mod record;

mod session;

/// Single-job tracking
pub mod tracker;

/// Utility functions and helpers
pub mod utils;


pub use api::*;
pub use batch::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use crate::metrics::*;
pub use notification::*;
pub use record::*;
pub use session::SessionState;
pub use tracker::*;
pub use utils::*;
