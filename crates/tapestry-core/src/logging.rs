//! Logging init: append to a file in the XDG state dir, or stderr when that
//! is not writable.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "tapestry.log";
const FILE_FILTER: &str = "info,tapestry=debug";
/// Commands report their own failures on stderr; only errors from the
/// library would add anything there.
const STDERR_FILTER: &str = "error";

/// Where log events ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter
/// of either target. Safe to call more than once; later calls only report
/// the target they would have used.
pub fn init_logging() -> LogTarget {
    let opened = xdg::BaseDirectories::with_prefix("tapestry")
        .map_err(anyhow::Error::from)
        .and_then(|dirs| open_log_file(&dirs.get_state_home()));

    match opened {
        Ok((file, path)) => {
            install(filter(FILE_FILTER), Mutex::new(file));
            tracing::debug!(path = %path.display(), "logging initialized");
            LogTarget::File(path)
        }
        Err(err) => {
            install(filter(STDERR_FILTER), io::stderr);
            tracing::debug!("log file unavailable: {err:#}");
            LogTarget::Stderr
        }
    }
}

/// Creates `dir` if needed and opens `dir/tapestry.log` for appending.
pub fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok((file, path))
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn install<W>(filter: EnvFilter, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    // Fails only when a global subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}
