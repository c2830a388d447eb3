//! Errors for the two non-fatal fault domains: feed fetches and image lookups.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Server answered with a non-2xx status
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    /// Body was fetched but is not a feed feed-rs understands
    #[error("failed to parse feed {url}: {message}")]
    Parse { url: String, message: String },
}

impl FetchError {
    pub fn request(url: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
