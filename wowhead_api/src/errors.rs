//! Error types for the page client.

use std::time::Duration;

/// Errors that can occur when fetching a remote resource.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The resource URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The server returned a non-success status. `retry_after` carries the
    /// `Retry-After` hint when the server sent one in seconds.
    #[error("Request failed with status {status}")]
    HttpStatus {
        status: u16,
        retry_after: Option<Duration>,
        body: String,
    },
}

impl Error {
    /// The HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server-provided retry delay, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::HttpStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
