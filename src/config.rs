//! Configuration and request types with serde serialization/deserialization
//!
//! This module holds the polling defaults captured by every tracker session,
//! the settings-update surface used to change them, and the caller-side
//! request and thumbnail parameter types.

use crate::{validate_url, EventsError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Polling defaults for tracker sessions
///
/// A session copies these values when it is created; changing the client's
/// defaults afterwards never affects a session already in flight.
///
/// # Examples
///
/// ```rust
/// use screenshot_events::TrackerConfig;
/// use std::time::Duration;
///
/// let config = TrackerConfig::default();
/// assert_eq!(config.timeout, Duration::from_secs(300));
///
/// let fast = TrackerConfig {
///     interval: Duration::from_millis(250),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Give up on a job (or a whole batch) after this long (default: 5 minutes)
    ///
    /// Measured from submission; checked after every non-terminal response.
    pub timeout: Duration,

    /// Delay between two status queries for the same job (default: 1 second)
    pub interval: Duration,
}

impl TrackerConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 5);
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    /// Merge a settings update over the current values.
    ///
    /// Nothing is changed if any supplied value is invalid.
    pub fn apply(&mut self, update: &SettingsUpdate) -> Result<(), EventsError> {
        let timeout = update
            .timeout
            .map(|secs| seconds_to_duration("timeout", secs))
            .transpose()?;
        let interval = update
            .interval
            .map(|secs| seconds_to_duration("interval", secs))
            .transpose()?;

        if interval == Some(Duration::ZERO) {
            return Err(EventsError::ConfigurationError(
                "interval must be greater than zero".to_string(),
            ));
        }

        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }
        if let Some(interval) = interval {
            self.interval = interval;
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

fn seconds_to_duration(name: &str, secs: f64) -> Result<Duration, EventsError> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        EventsError::ConfigurationError(format!("{name} must be a non-negative number of seconds, got {secs}"))
    })
}

/// Partial update of [`TrackerConfig`], in (possibly fractional) seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
}

impl SettingsUpdate {
    pub fn timeout(secs: f64) -> Self {
        Self {
            timeout: Some(secs),
            ..Default::default()
        }
    }

    pub fn interval(secs: f64) -> Self {
        Self {
            interval: Some(secs),
            ..Default::default()
        }
    }
}

/// Parameters for one screenshot job
///
/// Provider-specific options (`instance_id`, `size`, `cache`, ...) go in
/// `options` and are forwarded untouched.
///
/// # Examples
///
/// ```rust
/// use screenshot_events::JobRequest;
///
/// let request = JobRequest::new("https://example.com")
///     .with_details(2)
///     .with_option("instance_id", 12)
///     .with_original_url("example");
/// assert_eq!(request.detail_level(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct JobRequest {
    #[serde(default)]
    pub url: String,

    /// Richness of the provider's job record, 0 (minimal) to 3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<u8>,

    /// Correlation tag copied onto every record reported for this job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,

    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl JobRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: u8) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_original_url(mut self, tag: impl Into<String>) -> Self {
        self.original_url = Some(tag.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn detail_level(&self) -> u8 {
        self.details.unwrap_or(0)
    }

    /// Fill every field this request leaves unset from `common`.
    pub fn merged_over(&self, common: &JobRequest) -> JobRequest {
        let mut options = common.options.clone();
        options.extend(self.options.clone());

        JobRequest {
            url: if self.url.is_empty() {
                common.url.clone()
            } else {
                self.url.clone()
            },
            details: self.details.or(common.details),
            original_url: self.original_url.clone().or_else(|| common.original_url.clone()),
            options,
        }
    }

    pub fn validate(&self) -> Result<(), EventsError> {
        validate_url(&self.url).map(|_| ())
    }
}

/// How a thumbnail is fitted into the requested box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailRatio {
    Fit,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailFormat {
    Png,
    Jpeg,
}

/// Thumbnail parameters forwarded to the provider
///
/// Unset fields are omitted so the provider applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ThumbnailOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<ThumbnailRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ThumbnailFormat>,
}

impl ThumbnailOptions {
    /// Flatten the set options into `key=value` pairs for a query string.
    pub fn to_query(&self) -> Result<Vec<(String, String)>, EventsError> {
        let value = serde_json::to_value(self)?;
        let pairs = match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(pairs)
    }
}
