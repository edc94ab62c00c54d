use crate::{EventsError, JobRequest};
use std::time::Duration;
use url::Url;

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else if seconds > 0 {
        format!("{}.{}s", seconds, millis / 100)
    } else {
        format!("{millis}ms")
    }
}

pub fn validate_url(url: &str) -> Result<Url, EventsError> {
    let parsed = Url::parse(url).map_err(|e| EventsError::InvalidUrl(format!("{url}: {e}")))?;

    // Providers only capture web pages
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(EventsError::InvalidUrl(format!("{url}: unsupported scheme {scheme}"))),
    }
}

/// Highest detail level across a batch, starting from the common value.
pub fn max_detail_level<'a>(common: Option<u8>, requests: impl IntoIterator<Item = &'a JobRequest>) -> u8 {
    requests
        .into_iter()
        .filter_map(|request| request.details)
        .fold(common.unwrap_or(0), u8::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.0s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m 5s");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?query=value").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("invalid-url").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_max_detail_level() {
        let requests = vec![
            JobRequest::new("https://a.test").with_details(1),
            JobRequest::new("https://b.test"),
            JobRequest::new("https://c.test").with_details(3),
        ];
        assert_eq!(max_detail_level(None, &requests), 3);
        assert_eq!(max_detail_level(None, Vec::<JobRequest>::new().iter()), 0);
        assert_eq!(max_detail_level(Some(2), &requests[..2]), 2);
    }
}
