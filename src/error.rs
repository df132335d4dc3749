//! Chinachu API error types and message classification

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Connection error: {0}")]
    ConnectionFailure(String),

    #[error("Invalid base URL")]
    InvalidBaseUrl,

    #[error("Unexpected request")]
    UnexpectedRequest,

    #[error("Non-HTTP response")]
    NonHttpResponse,

    #[error("Unexpected response object: {0}")]
    UnexpectedResponseObject(String),

    #[error("Unacceptable status code: {0}")]
    UnacceptableStatusCode(u16),
}

impl ApiError {
    /// Displayable message for the user; never empty
    pub fn message(&self) -> String {
        match self {
            ApiError::ConnectionFailure(msg) if msg.trim().is_empty() => "Connection failed.".to_string(),
            ApiError::ConnectionFailure(msg) => msg.clone(),
            ApiError::InvalidBaseUrl => "Request URL is invalid.".to_string(),
            ApiError::UnexpectedRequest => "Request URL is unexpected.".to_string(),
            ApiError::NonHttpResponse => "Response is not an HTTP response.".to_string(),
            ApiError::UnexpectedResponseObject(_) => "Response object is unexpected.".to_string(),
            ApiError::UnacceptableStatusCode(401) => "Authentication failed.".to_string(),
            ApiError::UnacceptableStatusCode(code) => format!("HTTP {} {}", code, status_reason(*code)),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::UnacceptableStatusCode(code) => Some(*code),
            _ => None,
        }
    }
}

fn status_reason(code: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown Status")
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::BadUri(_) | ureq::Error::Http(_) => ApiError::UnexpectedRequest,
            ureq::Error::Protocol(_) => ApiError::NonHttpResponse,
            other => ApiError::ConnectionFailure(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::ConnectionFailure(err.to_string())
    }
}

/// Short preview of a payload for error reporting
pub(crate) fn payload_preview(bytes: &[u8]) -> String {
    const MAX: usize = 64;
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(MAX)]);
    if bytes.len() > MAX {
        format!("{}... ({} bytes)", text, bytes.len())
    } else {
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_is_authentication_failure() {
        assert_eq!(ApiError::UnacceptableStatusCode(401).message(), "Authentication failed.");
    }

    #[test]
    fn test_other_status_codes() {
        let msg = ApiError::UnacceptableStatusCode(503).message();
        assert!(msg.starts_with("HTTP 503"));
        assert_eq!(msg, "HTTP 503 Service Unavailable");
        assert_eq!(ApiError::UnacceptableStatusCode(799).message(), "HTTP 799 Unknown Status");
    }

    #[test]
    fn test_connection_failure_is_verbatim() {
        let err = ApiError::ConnectionFailure("timeout: global".to_string());
        assert_eq!(err.message(), "timeout: global");
        assert_eq!(ApiError::ConnectionFailure(String::new()).message(), "Connection failed.");
    }

    #[test]
    fn test_every_kind_has_a_message() {
        let errors = [
            ApiError::ConnectionFailure("refused".into()),
            ApiError::InvalidBaseUrl,
            ApiError::UnexpectedRequest,
            ApiError::NonHttpResponse,
            ApiError::UnexpectedResponseObject(String::new()),
            ApiError::UnacceptableStatusCode(500),
        ];
        for err in errors {
            assert!(!err.message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn test_payload_preview_truncates() {
        assert_eq!(payload_preview(b"maintenance"), "maintenance");
        let long = vec![b'a'; 100];
        assert!(payload_preview(&long).ends_with("(100 bytes)"));
    }
}
