//! Classification of a single attempt.

use crate::error::TransportError;
use crate::traits::HttpResponse;
use bytes::Bytes;

/// What one attempt produced, as far as retrying is concerned.
#[derive(Debug)]
pub enum RequestOutcome {
    /// 2xx response
    Success {
        /// HTTP status code
        status: u16,
        /// Response body
        body: Bytes,
    },

    /// Any other non-5xx response; terminal
    ///
    /// Covers 4xx and the stray 1xx/3xx that survive redirect following.
    ClientError {
        /// HTTP status code
        status: u16,
        /// Response body
        body: Bytes,
    },

    /// 5xx response; eligible for retry
    ServerError {
        /// HTTP status code
        status: u16,
        /// Response body
        body: Bytes,
    },

    /// No response was obtained; terminal
    TransportError(TransportError),
}

impl RequestOutcome {
    /// Classify a response by status class.
    pub fn from_response(response: HttpResponse) -> Self {
        match response.status {
            200..=299 => Self::Success {
                status: response.status,
                body: response.body,
            },
            500..=599 => Self::ServerError {
                status: response.status,
                body: response.body,
            },
            status => Self::ClientError {
                status,
                body: response.body,
            },
        }
    }

    /// Whether the executor may try again after this outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServerError { .. })
    }

    /// Status code of the response, if one was obtained.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. }
            | Self::ClientError { status, .. }
            | Self::ServerError { status, .. } => Some(*status),
            Self::TransportError(_) => None,
        }
    }
}

impl From<crate::error::Result<HttpResponse>> for RequestOutcome {
    fn from(result: crate::error::Result<HttpResponse>) -> Self {
        match result {
            Ok(response) => Self::from_response(response),
            Err(err) => Self::TransportError(err),
        }
    }
}
