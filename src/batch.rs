//! Batch tracker
//!
//! Fires one `create_job` per request without waiting for the others, then
//! polls every job on its own task. All tasks report into one shared
//! `BatchSession`, which owns the record collection and decides when the
//! batch is complete or timed out.

use crate::session::Session;
use crate::tracker::submit;
use crate::{
    max_detail_level, ApiError, EventsError, JobId, JobRecord, JobRequest, Notification,
    NotificationStream, ScreenshotApi, TimedOut, TrackerConfig, TrackerMetrics,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Tracks several screenshot jobs as one session
pub struct BatchTracker {
    api: Arc<dyn ScreenshotApi>,
    config: TrackerConfig,
    metrics: Arc<TrackerMetrics>,
}

impl BatchTracker {
    pub fn new(api: Arc<dyn ScreenshotApi>, config: TrackerConfig, metrics: Arc<TrackerMetrics>) -> Self {
        Self { api, config, metrics }
    }

    /// Submit every request, each merged over `common`, and follow them.
    ///
    /// Every status query of the batch uses the highest detail level found in
    /// `common` and the merged requests. An empty batch completes at once.
    /// Must be called from within a Tokio runtime.
    pub fn create_multiple(
        &self,
        requests: Vec<JobRequest>,
        common: JobRequest,
    ) -> Result<NotificationStream, EventsError> {
        let requests: Vec<JobRequest> = requests.iter().map(|r| r.merged_over(&common)).collect();
        for request in &requests {
            request.validate()?;
        }

        let details = max_detail_level(common.details, &requests);
        let (mut session, stream) = Session::open(self.config.clone(), self.metrics.clone());

        if requests.is_empty() {
            session.finish(Notification::Complete(Vec::new()));
            return Ok(stream);
        }

        info!(
            "Session {}: tracking {} screenshots (details: {})",
            session.id(),
            requests.len(),
            details
        );

        let interval = session.interval();
        let (cancel, cancelled) = watch::channel(false);
        let batch = Arc::new(Mutex::new(BatchSession {
            expected: requests.len(),
            records: Vec::with_capacity(requests.len()),
            session,
            cancel,
        }));

        for request in requests {
            let member = Member {
                api: self.api.clone(),
                metrics: self.metrics.clone(),
                batch: batch.clone(),
                cancelled: cancelled.clone(),
                request,
                details,
                interval,
            };
            tokio::spawn(member.run());
        }

        Ok(stream)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Poll,
    Stop,
}

struct BatchSession {
    session: Session,
    records: Vec<JobRecord>,
    expected: usize,
    cancel: watch::Sender<bool>,
}

impl BatchSession {
    fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Fold a record into the collection and notify.
    ///
    /// `slot` is the job's position in the collection, `None` for its first
    /// response. Returns the slot and the merged record.
    fn observe(&mut self, slot: Option<usize>, update: JobRecord) -> (usize, JobRecord, Step) {
        let slot = match slot {
            Some(slot) => {
                self.records[slot].merge(update);
                slot
            }
            None => {
                self.records.push(update);
                self.records.len() - 1
            }
        };
        let record = self.records[slot].clone();

        if !self.is_active() {
            return (slot, record, Step::Stop);
        }

        let terminal = record.is_terminal();
        self.session.emit(Notification::for_record(record.clone()));

        let step = if terminal {
            self.check_complete();
            Step::Stop
        } else if self.check_timeout() {
            Step::Stop
        } else {
            Step::Poll
        };
        (slot, record, step)
    }

    fn poll_failed(&mut self, id: &JobId, err: &ApiError) -> Step {
        warn!("Status query for screenshot {} failed: {}", id, err);
        self.session.metrics().record_api_error();

        if !self.is_active() || self.check_timeout() {
            Step::Stop
        } else {
            Step::Poll
        }
    }

    /// Emit `complete` once every submitted job has reported a terminal status.
    fn check_complete(&mut self) -> bool {
        let pending: Vec<_> = self.records.iter().filter(|r| !r.is_terminal()).collect();
        for record in &pending {
            debug!("Screenshot {} is not finished: {}", record.id, record.status);
        }

        // A terminal answer can arrive before other submissions have answered at all
        if !pending.is_empty() || self.records.len() != self.expected {
            return false;
        }

        self.session.finish(Notification::Complete(self.records.clone()));
        self.cancel.send_replace(true);
        true
    }

    fn check_timeout(&mut self) -> bool {
        if !self.session.timed_out() {
            return false;
        }

        self.session
            .finish(Notification::Timeout(TimedOut::Batch(self.records.clone())));
        self.cancel.send_replace(true);
        true
    }
}

struct Member {
    api: Arc<dyn ScreenshotApi>,
    metrics: Arc<TrackerMetrics>,
    batch: Arc<Mutex<BatchSession>>,
    cancelled: watch::Receiver<bool>,
    request: JobRequest,
    details: u8,
    interval: Duration,
}

impl Member {
    async fn run(mut self) {
        let tag = self.request.original_url.clone();

        let first = submit(self.api.as_ref(), &self.request, &self.metrics).await;
        let (slot, mut record, mut step) = self.batch.lock().await.observe(None, first);

        while step == Step::Poll {
            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = self.cancelled.changed() => return,
            }

            if !self.batch.lock().await.is_active() {
                debug!("Batch detached, not polling {}", record.id);
                return;
            }

            self.metrics.record_poll();
            step = match self.api.job_status(&record.id, self.details).await {
                Ok(update) => {
                    let update = update.with_correlation(tag.as_deref());
                    let (_, merged, step) = self.batch.lock().await.observe(Some(slot), update);
                    record = merged;
                    step
                }
                Err(e) if !e.is_retryable() => {
                    warn!("Status query for screenshot {} rejected: {}", record.id, e);
                    self.metrics.record_api_error();
                    let update = JobRecord::rejected(&record.id, &e);
                    let (_, _, step) = self.batch.lock().await.observe(Some(slot), update);
                    step
                }
                Err(e) => self.batch.lock().await.poll_failed(&record.id, &e),
            };
        }
    }
}
