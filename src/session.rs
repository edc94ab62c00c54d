//! Timeout and completion policy shared by both trackers
//!
//! A [`Session`] owns the sending half of a [`NotificationStream`]. It only
//! delivers while [`SessionState::Active`]; [`Session::finish`] emits the
//! terminal notification, flips the state and drops the sender, so nothing
//! can be delivered afterwards no matter how many polls are still in flight.

use crate::{format_duration, Notification, NotificationStream, TrackerConfig, TrackerMetrics};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Terminal,
}

pub(crate) struct Session {
    id: Uuid,
    config: TrackerConfig,
    start: Instant,
    state: SessionState,
    sender: Option<mpsc::UnboundedSender<Notification>>,
    metrics: Arc<TrackerMetrics>,
}

impl Session {
    /// Start a session with a snapshot of `config`.
    pub fn open(config: TrackerConfig, metrics: Arc<TrackerMetrics>) -> (Self, NotificationStream) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        let stream = NotificationStream::new(id, Utc::now(), receiver);

        metrics.record_session_start();
        debug!(
            "Session {} opened (timeout: {}, interval: {})",
            id,
            format_duration(config.timeout),
            format_duration(config.interval)
        );

        let session = Self {
            id,
            config,
            start: Instant::now(),
            state: SessionState::Active,
            sender: Some(sender),
            metrics,
        };
        (session, stream)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn metrics(&self) -> &TrackerMetrics {
        &self.metrics
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Active and still listened to.
    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
            && self.sender.as_ref().is_some_and(|sender| !sender.is_closed())
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn timed_out(&self) -> bool {
        self.elapsed() >= self.config.timeout
    }

    /// Deliver a notification; a no-op once the session is terminal.
    pub fn emit(&mut self, notification: Notification) -> bool {
        if self.state == SessionState::Terminal {
            return false;
        }
        let Some(sender) = &self.sender else {
            return false;
        };

        self.metrics.record_notification(&notification);
        debug!("Session {}: {}", self.id, notification.name());
        sender.send(notification).is_ok()
    }

    /// Deliver the terminal notification and detach the stream.
    ///
    /// Only the first call has any effect.
    pub fn finish(&mut self, notification: Notification) -> bool {
        if self.state == SessionState::Terminal {
            return false;
        }

        let name = notification.name().to_string();
        let delivered = self.emit(notification);
        self.close();
        info!(
            "Session {} ended with {} after {}",
            self.id,
            name,
            format_duration(self.elapsed())
        );
        delivered
    }

    /// Become terminal without emitting anything.
    pub fn close(&mut self) {
        if self.state == SessionState::Terminal {
            return;
        }
        self.state = SessionState::Terminal;
        self.sender = None;
        self.metrics.record_session_end(self.elapsed());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JobRecord, TimedOut};
    use futures::StreamExt;

    fn open(timeout: Duration) -> (Session, NotificationStream, Arc<TrackerMetrics>) {
        let metrics = Arc::new(TrackerMetrics::new());
        let config = TrackerConfig {
            timeout,
            interval: Duration::from_secs(1),
        };
        let (session, stream) = Session::open(config, metrics.clone());
        (session, stream, metrics)
    }

    #[tokio::test]
    async fn test_finish_emits_once_and_ends_stream() {
        let (mut session, stream, metrics) = open(Duration::from_secs(60));

        assert!(session.emit(Notification::for_record(JobRecord::new(1u64, "in_queue"))));
        assert!(session.finish(Notification::for_record(JobRecord::new(1u64, "finished"))));
        assert_eq!(session.state(), SessionState::Terminal);

        assert!(!session.finish(Notification::Timeout(TimedOut::Job(JobRecord::new(1u64, "finished")))));
        assert!(!session.emit(Notification::for_record(JobRecord::new(1u64, "processing"))));

        let names: Vec<String> = stream.map(|n| n.name().to_string()).collect().await;
        assert_eq!(names, vec!["in_queue", "finished"]);
        assert_eq!(metrics.snapshot().active_sessions, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_captured_config() {
        let (session, _stream, _) = open(Duration::from_secs(5));
        assert!(!session.timed_out());

        tokio::time::advance(Duration::from_millis(4999)).await;
        assert!(!session.timed_out());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(session.timed_out());
    }

    #[tokio::test]
    async fn test_dropped_stream_deactivates_session() {
        let (session, stream, _) = open(Duration::from_secs(60));
        assert!(session.is_active());
        drop(stream);
        assert!(!session.is_active());
        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_drop_records_session_end() {
        let (session, _stream, metrics) = open(Duration::from_secs(60));
        assert_eq!(metrics.snapshot().active_sessions, 1);
        drop(session);
        assert_eq!(metrics.snapshot().active_sessions, 0);
    }
}
