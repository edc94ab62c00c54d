//! Single-job tracker
//!
//! Submits one request and polls its status until the job is terminal or the
//! session timeout elapses. Transient status query failures are retried at
//! the next interval; a rejected query fails the job.

use crate::session::Session;
use crate::{
    EventsError, JobRecord, JobRequest, Notification, NotificationStream, ScreenshotApi, TimedOut,
    TrackerConfig, TrackerMetrics,
};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Tracks one screenshot job from submission to a terminal notification
///
/// The tracker owns a snapshot of the polling configuration; build a new one
/// (or go through [`ScreenshotEvents`](crate::ScreenshotEvents)) to pick up
/// changed defaults.
pub struct JobTracker {
    api: Arc<dyn ScreenshotApi>,
    config: TrackerConfig,
    metrics: Arc<TrackerMetrics>,
}

impl JobTracker {
    pub fn new(api: Arc<dyn ScreenshotApi>, config: TrackerConfig, metrics: Arc<TrackerMetrics>) -> Self {
        Self { api, config, metrics }
    }

    /// Submit `request` and follow it in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn create(&self, request: JobRequest) -> Result<NotificationStream, EventsError> {
        request.validate()?;

        let (session, stream) = Session::open(self.config.clone(), self.metrics.clone());
        tokio::spawn(track(self.api.clone(), request, session));

        Ok(stream)
    }
}

async fn track(api: Arc<dyn ScreenshotApi>, request: JobRequest, mut session: Session) {
    let tag = request.original_url.clone();
    let details = request.detail_level();

    let mut record = submit(api.as_ref(), &request, session.metrics()).await;
    if settle(&mut session, &record) {
        return;
    }

    loop {
        sleep(session.interval()).await;
        if !session.is_active() {
            debug!("Session {} detached, not polling {}", session.id(), record.id);
            return;
        }

        session.metrics().record_poll();
        match api.job_status(&record.id, details).await {
            Ok(update) => {
                record.merge(update.with_correlation(tag.as_deref()));
                if settle(&mut session, &record) {
                    return;
                }
            }
            Err(e) if !e.is_retryable() => {
                warn!("Status query for screenshot {} rejected: {}", record.id, e);
                session.metrics().record_api_error();
                record.merge(JobRecord::rejected(&record.id, &e));
                settle(&mut session, &record);
                return;
            }
            Err(e) => {
                warn!("Status query for screenshot {} failed: {}", record.id, e);
                session.metrics().record_api_error();
                if session.timed_out() {
                    session.finish(Notification::Timeout(TimedOut::Job(record.clone())));
                    return;
                }
            }
        }
    }
}

/// Notify the observed state and decide whether polling is over.
fn settle(session: &mut Session, record: &JobRecord) -> bool {
    let notification = Notification::for_record(record.clone());

    if record.is_terminal() {
        session.finish(notification);
        return true;
    }

    session.emit(notification);
    if session.timed_out() {
        session.finish(Notification::Timeout(TimedOut::Job(record.clone())));
        return true;
    }
    false
}

/// Create the remote job, reporting a submission failure as a failed job.
pub(crate) async fn submit(api: &dyn ScreenshotApi, request: &JobRequest, metrics: &TrackerMetrics) -> JobRecord {
    match api.create_job(request).await {
        Ok(record) => {
            debug!("Screenshot {} created for {} ({})", record.id, request.url, record.status);
            record.with_correlation(request.original_url.as_deref())
        }
        Err(e) => {
            warn!("Failed to create screenshot for {}: {}", request.url, e);
            metrics.record_api_error();
            JobRecord::failed_submission(request, &e)
        }
    }
}
