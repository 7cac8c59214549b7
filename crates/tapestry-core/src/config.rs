use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Global configuration loaded from `~/.config/tapestry/config.toml`.
///
/// Every field has a default, so a partial file only overrides what it sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TapestryConfig {
    /// Byte budget for `safe-download` (default 100 MiB).
    pub max_download_bytes: u64,
    /// Whole-request timeout for `safe-download`, in seconds.
    pub download_timeout_secs: u64,
    /// Whole-request timeout when `extract-html` fetches a URL, in seconds.
    pub html_timeout_secs: u64,
    /// Byte budget when `extract-html` fetches a URL.
    pub html_max_bytes: u64,
    /// Default `max-length` for `sanitize-filename`.
    pub sanitize_max_length: usize,
    /// Resolve hosts and refuse internal addresses before connecting.
    pub check_resolved_addresses: bool,
}

impl Default for TapestryConfig {
    fn default() -> Self {
        Self {
            max_download_bytes: 100 * 1024 * 1024,
            download_timeout_secs: 300,
            html_timeout_secs: 30,
            html_max_bytes: 10 * 1024 * 1024,
            sanitize_max_length: 100,
            check_resolved_addresses: true,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tapestry")?;
    Ok(xdg_dirs.get_config_home().join("tapestry").join("config.toml"))
}

/// Load configuration from disk, or defaults when no file exists.
pub fn load() -> Result<TapestryConfig> {
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(TapestryConfig::default());
    }
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<TapestryConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: TapestryConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

/// Write the default configuration to `path`, creating parent directories.
pub fn write_default(path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(&TapestryConfig::default())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    tracing::info!("created default config at {}", path.display());
    Ok(())
}
