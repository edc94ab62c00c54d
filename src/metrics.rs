use crate::Notification;
use ::metrics::{register_counter, register_gauge, register_histogram, Counter, Gauge, Histogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters for tracker activity
///
/// Handles are no-ops unless built with [`TrackerMetrics::registered`], which
/// binds them to whatever recorder is installed globally. A local tally is
/// kept either way so [`TrackerMetrics::snapshot`] always works.
pub struct TrackerMetrics {
    pub sessions_started: Counter,
    pub active_sessions: Gauge,
    pub notifications: Counter,
    pub jobs_finished: Counter,
    pub jobs_failed: Counter,
    pub timeouts: Counter,
    pub batches_completed: Counter,
    pub polls: Counter,
    pub api_errors: Counter,
    pub session_duration: Histogram,
    tally: Tally,
}

#[derive(Default)]
struct Tally {
    sessions_started: AtomicU64,
    sessions_ended: AtomicU64,
    notifications: AtomicU64,
    jobs_finished: AtomicU64,
    jobs_failed: AtomicU64,
    timeouts: AtomicU64,
    batches_completed: AtomicU64,
    polls: AtomicU64,
    api_errors: AtomicU64,
}

impl TrackerMetrics {
    pub fn new() -> Self {
        Self {
            sessions_started: Counter::noop(),
            active_sessions: Gauge::noop(),
            notifications: Counter::noop(),
            jobs_finished: Counter::noop(),
            jobs_failed: Counter::noop(),
            timeouts: Counter::noop(),
            batches_completed: Counter::noop(),
            polls: Counter::noop(),
            api_errors: Counter::noop(),
            session_duration: Histogram::noop(),
            tally: Tally::default(),
        }
    }

    pub fn registered() -> Self {
        Self {
            sessions_started: register_counter!("screenshot_events_sessions_started_total"),
            active_sessions: register_gauge!("screenshot_events_active_sessions"),
            notifications: register_counter!("screenshot_events_notifications_total"),
            jobs_finished: register_counter!("screenshot_events_jobs_finished_total"),
            jobs_failed: register_counter!("screenshot_events_jobs_failed_total"),
            timeouts: register_counter!("screenshot_events_timeouts_total"),
            batches_completed: register_counter!("screenshot_events_batches_completed_total"),
            polls: register_counter!("screenshot_events_polls_total"),
            api_errors: register_counter!("screenshot_events_api_errors_total"),
            session_duration: register_histogram!("screenshot_events_session_duration_seconds"),
            tally: Tally::default(),
        }
    }

    pub fn record_session_start(&self) {
        self.sessions_started.increment(1);
        self.active_sessions.increment(1.0);
        self.tally.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_end(&self, duration: Duration) {
        self.active_sessions.decrement(1.0);
        self.session_duration.record(duration.as_secs_f64());
        self.tally.sessions_ended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification(&self, notification: &Notification) {
        self.notifications.increment(1);
        self.tally.notifications.fetch_add(1, Ordering::Relaxed);

        match notification {
            Notification::Finished(_) => {
                self.jobs_finished.increment(1);
                self.tally.jobs_finished.fetch_add(1, Ordering::Relaxed);
            }
            Notification::Failed(_) => {
                self.jobs_failed.increment(1);
                self.tally.jobs_failed.fetch_add(1, Ordering::Relaxed);
            }
            Notification::Timeout(_) => {
                self.timeouts.increment(1);
                self.tally.timeouts.fetch_add(1, Ordering::Relaxed);
            }
            Notification::Complete(_) => {
                self.batches_completed.increment(1);
                self.tally.batches_completed.fetch_add(1, Ordering::Relaxed);
            }
            Notification::Status(_) => {}
        }
    }

    pub fn record_poll(&self) {
        self.polls.increment(1);
        self.tally.polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_error(&self) {
        self.api_errors.increment(1);
        self.tally.api_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let started = self.tally.sessions_started.load(Ordering::Relaxed);
        let ended = self.tally.sessions_ended.load(Ordering::Relaxed);

        MetricsSnapshot {
            sessions_started: started,
            active_sessions: started.saturating_sub(ended),
            notifications: self.tally.notifications.load(Ordering::Relaxed),
            jobs_finished: self.tally.jobs_finished.load(Ordering::Relaxed),
            jobs_failed: self.tally.jobs_failed.load(Ordering::Relaxed),
            timeouts: self.tally.timeouts.load(Ordering::Relaxed),
            batches_completed: self.tally.batches_completed.load(Ordering::Relaxed),
            polls: self.tally.polls.load(Ordering::Relaxed),
            api_errors: self.tally.api_errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for TrackerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sessions_started: u64,
    pub active_sessions: u64,
    pub notifications: u64,
    pub jobs_finished: u64,
    pub jobs_failed: u64,
    pub timeouts: u64,
    pub batches_completed: u64,
    pub polls: u64,
    pub api_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JobRecord, TimedOut};

    #[test]
    fn test_notification_tally() {
        let metrics = TrackerMetrics::new();
        metrics.record_notification(&Notification::Status(JobRecord::new(1u64, "in_queue")));
        metrics.record_notification(&Notification::Finished(JobRecord::new(1u64, "finished")));
        metrics.record_notification(&Notification::Failed(JobRecord::new(2u64, "error")));
        metrics.record_notification(&Notification::Timeout(TimedOut::Batch(Vec::new())));
        metrics.record_notification(&Notification::Complete(Vec::new()));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.notifications, 5);
        assert_eq!(snapshot.jobs_finished, 1);
        assert_eq!(snapshot.jobs_failed, 1);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.batches_completed, 1);
    }

    #[test]
    fn test_session_accounting() {
        let metrics = TrackerMetrics::new();
        metrics.record_session_start();
        metrics.record_session_start();
        metrics.record_session_end(Duration::from_millis(1500));
        metrics.record_poll();
        metrics.record_api_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sessions_started, 2);
        assert_eq!(snapshot.active_sessions, 1);
        assert_eq!(snapshot.polls, 1);
        assert_eq!(snapshot.api_errors, 1);
    }
}
