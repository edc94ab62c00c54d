//! Provider-side view of a screenshot job
//!
//! A [`JobRecord`] is whatever the remote service reports about a job. Records
//! returned by successive polls are merged into the tracker's copy instead of
//! replacing it, so fields only the caller knows about (the correlation tag)
//! survive every status update.

use crate::{ApiError, JobRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque, provider-assigned job identifier
///
/// Providers commonly send numeric ids; both numbers and strings are accepted
/// when deserializing. An empty id means the provider never assigned one
/// (the job could not be created).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawJobId", into = "String")]
pub struct JobId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawJobId {
    Number(u64),
    Text(String),
}

impl From<RawJobId> for JobId {
    fn from(raw: RawJobId) -> Self {
        match raw {
            RawJobId::Number(n) => JobId(n.to_string()),
            RawJobId::Text(s) => JobId(s),
        }
    }
}

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status as reported by the provider
///
/// Only `finished` and `error` are terminal. Every other value (`in_queue`,
/// `processing`, or anything a provider invents) is kept verbatim so it can be
/// passed through as a notification name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Finished,
    Error,
    InProgress(String),
}

impl JobStatus {
    pub const FINISHED: &'static str = "finished";
    pub const ERROR: &'static str = "error";

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Finished => Self::FINISHED,
            JobStatus::Error => Self::ERROR,
            JobStatus::InProgress(status) => status,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Error)
    }
}

impl From<String> for JobStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            Self::FINISHED => JobStatus::Finished,
            Self::ERROR => JobStatus::Error,
            _ => JobStatus::InProgress(status),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(status: &str) -> Self {
        Self::from(status.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::InProgress(status) => status,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,

    /// URL the provider is capturing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// URL after redirections, once known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,

    /// Caller-supplied correlation tag, copied from the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Every other provider field, kept verbatim
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl JobRecord {
    pub fn new(id: impl Into<JobId>, status: impl Into<JobStatus>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            url: None,
            final_url: None,
            original_url: None,
            error: None,
            details: Map::new(),
        }
    }

    /// Record standing in for a job the provider never accepted.
    pub fn failed_submission(request: &JobRequest, err: &ApiError) -> Self {
        Self {
            id: JobId::default(),
            status: JobStatus::Error,
            url: Some(request.url.clone()),
            final_url: None,
            original_url: request.original_url.clone(),
            error: Some(err.to_string()),
            details: Map::new(),
        }
    }

    /// Update ending a job whose status can no longer be queried.
    pub fn rejected(id: &JobId, err: &ApiError) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::new(id.clone(), JobStatus::Error)
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fold a newer view of the same job into this one.
    ///
    /// The status always follows the update; optional fields and details only
    /// change when the update carries them.
    pub fn merge(&mut self, update: JobRecord) {
        if !update.id.is_unassigned() {
            self.id = update.id;
        }
        self.status = update.status;

        if update.url.is_some() {
            self.url = update.url;
        }
        if update.final_url.is_some() {
            self.final_url = update.final_url;
        }
        if update.original_url.is_some() {
            self.original_url = update.original_url;
        }
        if update.error.is_some() {
            self.error = update.error;
        }
        self.details.extend(update.details);
    }

    pub fn with_correlation(mut self, tag: Option<&str>) -> Self {
        if let Some(tag) = tag {
            self.original_url = Some(tag.to_string());
        }
        self
    }
}
