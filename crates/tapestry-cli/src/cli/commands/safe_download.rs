//! `tapestry safe-download <url> <output>`: bounded download to a file.

use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tapestry_core::config::TapestryConfig;
use tapestry_core::fetch::{self, DownloadOptions};

/// Config limits with command-line overrides applied.
pub(crate) fn download_options(
    cfg: &TapestryConfig,
    max_size: Option<u64>,
    timeout: Option<u64>,
) -> DownloadOptions {
    let mut opts = DownloadOptions::from_config(cfg);
    if let Some(max) = max_size {
        opts = opts.with_max_bytes(max);
    }
    if let Some(secs) = timeout {
        opts = opts.with_timeout(Duration::from_secs(secs));
    }
    opts
}

pub fn run_safe_download(
    out: &mut impl Write,
    cfg: &TapestryConfig,
    url: &str,
    output: &Path,
    max_size: Option<u64>,
    timeout: Option<u64>,
) -> Result<()> {
    let opts = download_options(cfg, max_size, timeout);
    let done = fetch::download(url, output, &opts)?;
    writeln!(
        out,
        "Downloaded {} bytes to {}",
        done.bytes_written,
        done.path.display()
    )?;
    Ok(())
}
