//! Download failure type.

use crate::url_guard::Rejection;

/// Why a bounded download did not produce a file. Every variant is terminal;
/// nothing in this crate retries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DownloadError {
    /// The URL (or a redirect target) failed validation.
    #[error("Invalid URL: {0}")]
    InvalidUrl(Rejection),
    /// The server declared a Content-Length above the budget.
    #[error("File too large: {declared} bytes (max {max})")]
    TooLarge { declared: u64, max: u64 },
    /// The streamed body grew past the budget.
    #[error("Download exceeded max size ({max} bytes)")]
    SizeExceeded { max: u64 },
    /// Non-2xx final response.
    #[error("HTTP error {status}: {reason}")]
    HttpError { status: u32, reason: String },
    /// Connection, DNS, TLS, or protocol failure.
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The whole-request deadline expired.
    #[error("Download timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    /// Creating, writing, or committing the local file failed.
    #[error("Filesystem error: {0}")]
    FilesystemError(String),
}

// The rejection is part of the message, not a source.
impl From<Rejection> for DownloadError {
    fn from(rejection: Rejection) -> Self {
        DownloadError::InvalidUrl(rejection)
    }
}

impl DownloadError {
    pub(crate) fn filesystem(err: anyhow::Error) -> Self {
        DownloadError::FilesystemError(format!("{err:#}"))
    }
}

/// Reason phrase for responses that do not carry one (HTTP/2 and later).
pub(crate) fn reason_phrase(status: u32) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        410 => "Gone",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        300..=399 => "Redirect",
        _ => "Unknown Status",
    }
}
