//! Bounded, validated downloads.
//!
//! [`download`] validates the URL, streams the body into a temp file beside
//! the destination under a byte budget and a whole-request deadline, and
//! renames it into place only after a clean end of stream. Any failure drops
//! the temp file, so the destination is either fully written or untouched.
//!
//! Calls share no state. Two concurrent downloads to the same destination
//! race on the final rename and the last one wins.

mod error;
mod pin;
mod transfer;

pub use error::DownloadError;
pub use transfer::{CHUNK_SIZE, MAX_REDIRECTS, USER_AGENT};

use crate::config::TapestryConfig;
use crate::storage::StorageWriter;
use crate::url_guard::{self, HostPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default byte budget: 100 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

/// Default whole-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Limits and policy for one download.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub max_bytes: u64,
    pub timeout: Duration,
    pub host_policy: HostPolicy,
    /// Resolve the host before connecting, reject internal addresses, and pin
    /// the connection to the checked address.
    pub check_resolved_addresses: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            timeout: DEFAULT_TIMEOUT,
            host_policy: HostPolicy::Public,
            check_resolved_addresses: true,
        }
    }
}

impl DownloadOptions {
    /// Options for file downloads taken from the loaded config.
    pub fn from_config(cfg: &TapestryConfig) -> Self {
        Self {
            max_bytes: cfg.max_download_bytes,
            timeout: Duration::from_secs(cfg.download_timeout_secs),
            check_resolved_addresses: cfg.check_resolved_addresses,
            ..Self::default()
        }
    }

    /// Options for fetching a page for text extraction.
    pub fn for_pages(cfg: &TapestryConfig) -> Self {
        Self {
            max_bytes: cfg.html_max_bytes,
            timeout: Duration::from_secs(cfg.html_timeout_secs),
            check_resolved_addresses: cfg.check_resolved_addresses,
            ..Self::default()
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_host_policy(mut self, policy: HostPolicy) -> Self {
        self.host_policy = policy;
        self
    }
}

/// A committed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub bytes_written: u64,
    pub path: PathBuf,
}

/// Result of one [`download`] call.
pub type DownloadOutcome = Result<Downloaded, DownloadError>;

/// Downloads `url` to `destination` under the limits in `opts`.
///
/// Validation failures return before any filesystem or network I/O. Parent
/// directories of `destination` are created as needed; an existing file at
/// `destination` is replaced only on success.
pub fn download(url: &str, destination: &Path, opts: &DownloadOptions) -> DownloadOutcome {
    let validated = url_guard::validate_with(url, opts.host_policy)?;
    let url = validated.into_url();

    let mut writer = StorageWriter::create_for(destination).map_err(DownloadError::filesystem)?;
    tracing::debug!(
        %url,
        temp = %writer.temp_path().display(),
        max_bytes = opts.max_bytes,
        timeout_secs = opts.timeout.as_secs(),
        "starting download"
    );

    let received = transfer::fetch_into(url, &mut writer, opts)?;
    let bytes_written = writer
        .finalize(destination)
        .map_err(DownloadError::filesystem)?;
    debug_assert_eq!(received, bytes_written);

    tracing::info!(
        bytes = bytes_written,
        path = %destination.display(),
        "download committed"
    );
    Ok(Downloaded {
        bytes_written,
        path: destination.to_path_buf(),
    })
}

/// Fetches `url` into memory under the same validation and limits as
/// [`download`], decoding the body as UTF-8 (invalid sequences replaced).
pub fn fetch_text(url: &str, opts: &DownloadOptions) -> Result<String, DownloadError> {
    let validated = url_guard::validate_with(url, opts.host_policy)?;
    let mut body = Vec::new();
    transfer::fetch_into(validated.into_url(), &mut body, opts)?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}
