//! Error taxonomy for everything that can go wrong outside the pure model.
//!
//! Data integrity anomalies in backend payloads never show up here: the tree builder absorbs
//! them. What remains is transport failure, rejected input, and local I/O.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
/// Failures surfaced to the caller for display, never interpreted by the model.
pub enum Error {
    /// The configuration could not be turned into a usable client.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response (connection, DNS, timeout).
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status code.
    #[error("Backend returned HTTP {code}")]
    Status {
        /// HTTP status code of the response.
        code: u16,
    },

    /// The response body did not match the expected payload shape.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local file or terminal I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Status { code },
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {err}"))
    }
}
