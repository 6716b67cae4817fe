//! Transport and request error types

use bytes::Bytes;
use thiserror::Error;

/// Result type for single transport attempts
pub type Result<T> = std::result::Result<T, TransportError>;

/// Failures where no HTTP response was obtained
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not connect to the remote host
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request or the body read timed out
    #[error("Timeout")]
    Timeout,

    /// Any other failure while sending the request or reading the body
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request descriptor could not be turned into an HTTP request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body did not deserialize
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Terminal failure of a retried operation
///
/// Intermediate server errors never surface here; only the outcome that
/// ended the operation does.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The server rejected the request; not retried
    #[error("Client error (status {status}): {}", String::from_utf8_lossy(.body))]
    ClientError {
        /// HTTP status code
        status: u16,
        /// Response body
        body: Bytes,
    },

    /// The server kept failing past the retry ceiling
    #[error(
        "Retries exhausted after {attempts} attempts (last status {last_status}): {}",
        String::from_utf8_lossy(.last_body)
    )]
    ExhaustedRetries {
        /// Status of the final attempt
        last_status: u16,
        /// Body of the final attempt
        last_body: Bytes,
        /// Attempts made, including the first
        attempts: u32,
    },

    /// No response was obtained; not retried
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The caller cancelled the operation
    #[error("Request cancelled after {attempts} attempts")]
    Cancelled {
        /// Attempts issued before cancellation
        attempts: u32,
    },
}

impl RequestError {
    /// HTTP status of the response that ended the operation, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ClientError { status, .. } => Some(*status),
            Self::ExhaustedRetries { last_status, .. } => Some(*last_status),
            Self::Transport(_) | Self::Cancelled { .. } => None,
        }
    }

    /// Response body that ended the operation, if any
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Self::ClientError { body, .. } => Some(body),
            Self::ExhaustedRetries { last_body, .. } => Some(last_body),
            Self::Transport(_) | Self::Cancelled { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display_includes_body() {
        let err = RequestError::ClientError {
            status: 401,
            body: Bytes::from_static(b"invalid apikey"),
        };
        assert_eq!(err.to_string(), "Client error (status 401): invalid apikey");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_exhausted_display() {
        let err = RequestError::ExhaustedRetries {
            last_status: 503,
            last_body: Bytes::from_static(b"busy"),
            attempts: 51,
        };
        assert_eq!(
            err.to_string(),
            "Retries exhausted after 51 attempts (last status 503): busy"
        );
        assert_eq!(err.body().map(|b| b.as_ref()), Some(&b"busy"[..]));
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = RequestError::from(TransportError::Timeout);
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Timeout");
    }
}
