//! Event-driven client over a remote screenshot API
//!
//! This module provides [`ScreenshotEvents`], the entry point that owns the
//! API handle and the polling defaults, and hands out tracker sessions and
//! one-shot thumbnail fetches.

use crate::{
    BatchTracker, EventsError, JobId, JobRequest, JobTracker, NotificationStream, ScreenshotApi,
    SettingsUpdate, ThumbnailOptions, TrackerConfig, TrackerMetrics,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Screenshot client exposing job lifecycles as notification streams
///
/// Defaults live on the client, not in global state: two clients never see
/// each other's settings, and a session keeps the values it started with.
///
/// # Examples
///
/// ```rust,no_run
/// use futures::StreamExt;
/// use screenshot_events::{JobRequest, Notification, ScreenshotApi, ScreenshotEvents};
/// use std::sync::Arc;
///
/// async fn capture(api: Arc<dyn ScreenshotApi>) -> Result<(), Box<dyn std::error::Error>> {
///     let client = ScreenshotEvents::new(api);
///     let mut events = client.create(JobRequest::new("https://example.com"))?;
///
///     while let Some(notification) = events.next().await {
///         match notification {
///             Notification::Finished(record) => println!("done: {}", record.id),
///             Notification::Failed(record) => println!("failed: {:?}", record.error),
///             Notification::Timeout(_) => println!("gave up"),
///             other => println!("{}", other.name()),
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct ScreenshotEvents {
    api: Arc<dyn ScreenshotApi>,
    defaults: RwLock<TrackerConfig>,
    metrics: Arc<TrackerMetrics>,
}

/// A thumbnail fetched into memory
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Vec<u8>,
    /// Format sniffed from the payload, if recognized
    pub format: Option<image::ImageFormat>,
}

impl ScreenshotEvents {
    pub fn new(api: Arc<dyn ScreenshotApi>) -> Self {
        Self::with_config(api, TrackerConfig::default())
    }

    pub fn with_config(api: Arc<dyn ScreenshotApi>, config: TrackerConfig) -> Self {
        Self {
            api,
            defaults: RwLock::new(config),
            metrics: Arc::new(TrackerMetrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<TrackerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The underlying API client.
    pub fn api(&self) -> &Arc<dyn ScreenshotApi> {
        &self.api
    }

    pub fn metrics(&self) -> &Arc<TrackerMetrics> {
        &self.metrics
    }

    /// Current defaults, as a new session would capture them.
    pub fn defaults(&self) -> TrackerConfig {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merge `update` over the current defaults.
    ///
    /// Sessions already running are not affected.
    pub fn set_defaults(&self, update: SettingsUpdate) -> Result<(), EventsError> {
        let mut defaults = self.defaults.write().unwrap_or_else(PoisonError::into_inner);
        defaults.apply(&update)?;
        info!(
            "Defaults updated: timeout {:?}, interval {:?}",
            defaults.timeout, defaults.interval
        );
        Ok(())
    }

    /// Request one screenshot and follow it.
    ///
    /// Notifications: the provider's in-progress status names (`in_queue`,
    /// `processing`, ...), then exactly one of `finished`, `failed` or
    /// `timeout`.
    pub fn create(&self, request: JobRequest) -> Result<NotificationStream, EventsError> {
        JobTracker::new(self.api.clone(), self.defaults(), self.metrics.clone()).create(request)
    }

    /// Request several screenshots with individual `create_job` calls and
    /// follow them as one batch.
    ///
    /// Per-job notifications as for [`create`](Self::create), then exactly
    /// one of `complete` (all jobs finished or failed) or `timeout`.
    pub fn create_multiple(
        &self,
        requests: Vec<JobRequest>,
        common: JobRequest,
    ) -> Result<NotificationStream, EventsError> {
        BatchTracker::new(self.api.clone(), self.defaults(), self.metrics.clone())
            .create_multiple(requests, common)
    }

    /// Save a screenshot (or a thumbnail of it) to `path`.
    ///
    /// Resolves with the written file name.
    pub async fn save_thumbnail(
        &self,
        id: &JobId,
        path: impl AsRef<Path>,
        options: &ThumbnailOptions,
    ) -> Result<String, EventsError> {
        let path = path.as_ref();
        let saved = self.api.thumbnail_to_file(id, path, options).await?;

        if saved.is_empty() {
            return Err(EventsError::ThumbnailSave {
                path: PathBuf::from(path),
            });
        }

        debug!("Thumbnail of screenshot {} saved to {}", id, saved);
        Ok(saved)
    }

    /// Fetch a screenshot (or a thumbnail of it) into memory.
    pub async fn thumbnail(&self, id: &JobId, options: &ThumbnailOptions) -> Result<Thumbnail, EventsError> {
        let data = self.api.thumbnail(id, options).await?;

        if data.is_empty() {
            return Err(EventsError::EmptyThumbnail { id: id.clone() });
        }

        let format = image::guess_format(&data).ok();
        debug!(
            "Thumbnail of screenshot {} fetched: {} bytes ({:?})",
            id,
            data.len(),
            format
        );
        Ok(Thumbnail { data, format })
    }
}
