//! Error types for DigitalOcean API operations.
//!
//! Remote rejections keep the original request and the decoded error
//! body so callers can see exactly what the API refused and why.

use serde_json::Value as Json;
use thiserror::Error;

/// Result type alias for DigitalOcean operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the DigitalOcean API.
#[derive(Debug, Error)]
pub enum Error {
    /// The API answered with a non-success status.
    #[error("{method} {endpoint} rejected with HTTP {code}: {body}")]
    Rejected {
        /// HTTP method of the rejected request.
        method: String,
        /// Endpoint the request targeted.
        endpoint: String,
        /// HTTP status code of the response.
        code: u16,
        /// Decoded error body.
        body: Json,
        /// Request payload, for POST requests.
        payload: Option<Json>,
    },

    /// The API answered with a success status the caller did not expect.
    #[error("{method} {endpoint} returned HTTP {got}, expected {expected}")]
    UnexpectedStatus {
        /// HTTP method of the request.
        method: String,
        /// Endpoint the request targeted.
        endpoint: String,
        /// Status code the operation requires.
        expected: u16,
        /// Status code actually received.
        got: u16,
    },

    /// The request never produced a response (connection, DNS, TLS).
    #[error("transport error: {message}")]
    Transport {
        /// Detailed error message from the failed request.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// A response was missing a field the operation relies on.
    #[error("response from {endpoint} missing field {field:?}")]
    MissingField {
        /// Endpoint that produced the response.
        endpoint: String,
        /// The absent field.
        field: String,
    },
}

impl Error {
    /// Create a missing-field error.
    pub fn missing_field(endpoint: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            endpoint: endpoint.into(),
            field: field.into(),
        }
    }

    /// Create an unexpected-status error.
    pub fn unexpected_status(
        method: impl Into<String>,
        endpoint: impl Into<String>,
        expected: u16,
        got: u16,
    ) -> Self {
        Self::UnexpectedStatus {
            method: method.into(),
            endpoint: endpoint.into(),
            expected,
            got,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
