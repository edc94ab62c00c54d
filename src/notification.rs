//! Lifecycle notifications and the stream that delivers them

use crate::{JobRecord, JobStatus};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use uuid::Uuid;

/// One observed step in a job's (or batch's) lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A non-terminal provider status, named after the status itself
    Status(JobRecord),
    Finished(JobRecord),
    /// The provider reported `error`
    Failed(JobRecord),
    Timeout(TimedOut),
    /// Every job of a batch reached a terminal status
    Complete(Vec<JobRecord>),
}

/// Last known state when a session gave up waiting
#[derive(Debug, Clone, PartialEq)]
pub enum TimedOut {
    Job(JobRecord),
    Batch(Vec<JobRecord>),
}

impl Notification {
    pub const FAILED: &'static str = "failed";
    pub const TIMEOUT: &'static str = "timeout";
    pub const COMPLETE: &'static str = "complete";

    /// Classify a provider record: `error` becomes `failed`, everything else
    /// passes its status through.
    pub fn for_record(record: JobRecord) -> Self {
        match record.status {
            JobStatus::Finished => Notification::Finished(record),
            JobStatus::Error => Notification::Failed(record),
            JobStatus::InProgress(_) => Notification::Status(record),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Notification::Status(record) => record.status.as_str(),
            Notification::Finished(_) => JobStatus::FINISHED,
            Notification::Failed(_) => Self::FAILED,
            Notification::Timeout(_) => Self::TIMEOUT,
            Notification::Complete(_) => Self::COMPLETE,
        }
    }

    /// The single job this notification is about, if any.
    pub fn record(&self) -> Option<&JobRecord> {
        match self {
            Notification::Status(record)
            | Notification::Finished(record)
            | Notification::Failed(record)
            | Notification::Timeout(TimedOut::Job(record)) => Some(record),
            Notification::Timeout(TimedOut::Batch(_)) | Notification::Complete(_) => None,
        }
    }

    /// Whether this notification ends the lifecycle of a job.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Status(_))
    }
}

/// Notifications of one tracker session, in the order they were observed
///
/// The stream ends right after the session's terminal notification. Dropping
/// it (or calling [`close`](Self::close)) detaches the caller: trackers stop
/// before their next status query.
pub struct NotificationStream {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    receiver: mpsc::UnboundedReceiver<Notification>,
}

impl NotificationStream {
    pub(crate) fn new(
        session_id: Uuid,
        started_at: DateTime<Utc>,
        receiver: mpsc::UnboundedReceiver<Notification>,
    ) -> Self {
        Self {
            session_id,
            started_at,
            receiver,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Wait for the session to end and return everything it emitted.
    pub async fn collect_until_terminal(self) -> Vec<Notification> {
        self.collect().await
    }
}

impl Stream for NotificationStream {
    type Item = Notification;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_names() {
        let queued = Notification::for_record(JobRecord::new(1u64, "in_queue"));
        assert_eq!(queued.name(), "in_queue");
        assert!(!queued.is_terminal());

        let finished = Notification::for_record(JobRecord::new(1u64, "finished"));
        assert_eq!(finished.name(), "finished");
        assert!(finished.is_terminal());

        let failed = Notification::for_record(JobRecord::new(1u64, "error"));
        assert!(matches!(failed, Notification::Failed(_)));
        assert_eq!(failed.name(), "failed");

        assert_eq!(Notification::Timeout(TimedOut::Batch(Vec::new())).name(), "timeout");
        assert_eq!(Notification::Complete(Vec::new()).name(), "complete");
    }

    #[test]
    fn test_record_accessor() {
        let record = JobRecord::new(3u64, "processing");
        let timeout = Notification::Timeout(TimedOut::Job(record.clone()));
        assert_eq!(timeout.record(), Some(&record));
        assert!(Notification::Complete(vec![record]).record().is_none());
    }

    #[tokio::test]
    async fn test_stream_ends_when_sender_dropped() {
        let (sender, receiver) = mpsc::unbounded_channel();
        let stream = NotificationStream::new(Uuid::new_v4(), Utc::now(), receiver);

        sender
            .send(Notification::for_record(JobRecord::new(1u64, "finished")))
            .unwrap();
        drop(sender);

        let notifications = stream.collect_until_terminal().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].name(), "finished");
    }

    #[tokio::test]
    async fn test_close_is_seen_by_sender() {
        let (sender, receiver) = mpsc::unbounded_channel::<Notification>();
        let mut stream = NotificationStream::new(Uuid::new_v4(), Utc::now(), receiver);
        stream.close();
        assert!(sender.is_closed());
    }
}
