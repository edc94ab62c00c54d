//! Remote screenshot API seam
//!
//! The trackers never speak HTTP themselves. Anything able to create a job,
//! report its status and hand back thumbnails can drive them, whether that is
//! a real HTTP client or an in-memory fake.

use crate::{ApiError, JobId, JobRecord, JobRequest, ThumbnailOptions};
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScreenshotApi: Send + Sync {
    /// Ask the provider to start a screenshot job.
    ///
    /// The returned record may already be terminal when the provider serves
    /// the screenshot from its cache.
    async fn create_job(&self, request: &JobRequest) -> Result<JobRecord, ApiError>;

    /// Current view of a job, at the given detail level.
    async fn job_status(&self, id: &JobId, details: u8) -> Result<JobRecord, ApiError>;

    /// Download a thumbnail into `path`.
    ///
    /// Returns the name of the written file; an empty name means the
    /// provider had nothing to save.
    async fn thumbnail_to_file(
        &self,
        id: &JobId,
        path: &Path,
        options: &ThumbnailOptions,
    ) -> Result<String, ApiError>;

    /// Download a thumbnail into memory. An empty payload means failure.
    async fn thumbnail(&self, id: &JobId, options: &ThumbnailOptions) -> Result<Vec<u8>, ApiError>;
}
