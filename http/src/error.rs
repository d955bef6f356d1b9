//! Error types for HTTP-backed operations.

use thiserror::Error;

/// Errors produced by a [`JsonEndpoint`](crate::JsonEndpoint) operation.
///
/// These are the "raw" rejections handed to a slice; store them directly
/// (the slice's `E` parameter) or normalize them to strings with
/// `display_error`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The named credential source had nothing to offer
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The request never produced a response (connection, DNS, TLS)
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body could not be decoded into the expected type
    #[error("Response decoding failed: {0}")]
    Decode(String),

    /// Unauthorized - credentials rejected
    #[error("Unauthorized - credentials rejected")]
    Unauthorized,

    /// Rate limited - too many requests
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Any other non-success response
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },
}

impl HttpError {
    /// Whether a retry might help (transient failures only)
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) | Self::RateLimited => true,
            Self::Api { status, .. } => *status >= 500,
            Self::MissingCredentials(_) | Self::Decode(_) | Self::Unauthorized => false,
        }
    }
}
