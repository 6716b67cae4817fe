//! Error types for the Ramona client
//!
//! Every search call ends in exactly one of these. Server errors that were
//! retried away never appear here; only the outcome that ended the
//! operation does.

use ramona_transport::{RequestError, TransportError};
use thiserror::Error;

/// Result type alias for operations that can fail with a Ramona error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Ramona client.
#[derive(Debug, Error)]
pub enum Error {
    /// The API rejected the request (any non-2xx, non-5xx status).
    ///
    /// Never retried.
    #[error("Client error (status {status}): {body}")]
    ClientError {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },

    /// The API kept answering with server errors past the retry ceiling.
    #[error("Retries exhausted after {attempts} attempts (last status {status}): {body}")]
    ExhaustedRetries {
        /// Status of the final attempt
        status: u16,
        /// Body of the final attempt, lossily decoded
        body: String,
        /// Attempts made, including the first
        attempts: u32,
    },

    /// No HTTP response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The operation was cancelled by the caller.
    #[error("Request cancelled after {attempts} attempts")]
    Cancelled {
        /// Attempts issued before cancellation
        attempts: u32,
    },

    /// A query rendered to nothing, or a value is out of range.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Missing required configuration.
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Response body is not valid UTF-8.
    #[error("Response is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status of the response that ended the operation, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::ClientError { status, .. } | Error::ExhaustedRetries { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Whether the API rejected the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::ClientError { .. })
    }

    /// Whether server errors outlasted the retry ceiling.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::ExhaustedRetries { .. })
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::ClientError { status, body } => Error::ClientError {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            },
            RequestError::ExhaustedRetries {
                last_status,
                last_body,
                attempts,
            } => Error::ExhaustedRetries {
                status: last_status,
                body: String::from_utf8_lossy(&last_body).into_owned(),
                attempts,
            },
            RequestError::Transport(err) => Error::Transport(err),
            RequestError::Cancelled { attempts } => Error::Cancelled { attempts },
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}
