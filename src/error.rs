use crate::record::JobId;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a [`ScreenshotApi`](crate::ScreenshotApi) implementation.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error (status {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl ApiError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkError(_) | ApiError::IoError(_) => true,
            ApiError::Remote { status, .. } => *status >= 500 || *status == 429,
            ApiError::MalformedResponse(_) | ApiError::Unauthorized(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum EventsError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Failed to save thumbnail to {}", path.display())]
    ThumbnailSave { path: PathBuf },

    #[error("Empty thumbnail for screenshot {id}")]
    EmptyThumbnail { id: JobId },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedResponse(err.to_string())
    }
}

impl From<std::io::Error> for EventsError {
    fn from(err: std::io::Error) -> Self {
        EventsError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EventsError {
    fn from(err: serde_json::Error) -> Self {
        EventsError::SerializationError(err.to_string())
    }
}

impl From<url::ParseError> for EventsError {
    fn from(err: url::ParseError) -> Self {
        EventsError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_retryable() {
        assert!(ApiError::NetworkError("reset".to_string()).is_retryable());
        assert!(ApiError::remote(503, "busy").is_retryable());
        assert!(ApiError::remote(429, "slow down").is_retryable());
        assert!(!ApiError::remote(404, "no such screenshot").is_retryable());
        assert!(!ApiError::Unauthorized("bad key".to_string()).is_retryable());
    }

    #[test]
    fn test_thumbnail_errors_name_the_failing_value() {
        let err = EventsError::ThumbnailSave {
            path: PathBuf::from("/tmp/shot.png"),
        };
        assert_eq!(err.to_string(), "Failed to save thumbnail to /tmp/shot.png");

        let err = EventsError::EmptyThumbnail { id: JobId::from(42u64) };
        assert_eq!(err.to_string(), "Empty thumbnail for screenshot 42");
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let err: EventsError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, EventsError::InvalidUrl(_)));
    }
}
