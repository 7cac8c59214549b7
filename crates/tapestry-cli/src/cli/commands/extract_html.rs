//! `tapestry extract-html <url-or-path>`: readable text from a page.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tapestry_core::config::TapestryConfig;
use tapestry_core::fetch::{self, DownloadOptions};
use tapestry_core::html::extract_from_html;

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetches a URL (validated, bounded) or reads a local file, decoding as
/// UTF-8 with invalid bytes replaced.
fn load_source(cfg: &TapestryConfig, source: &str, timeout: Option<u64>) -> Result<String> {
    if is_remote(source) {
        let mut opts = DownloadOptions::for_pages(cfg);
        if let Some(secs) = timeout {
            opts = opts.with_timeout(Duration::from_secs(secs));
        }
        return Ok(fetch::fetch_text(source, &opts)?);
    }

    let path = Path::new(source);
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn run_extract_html(
    out: &mut impl Write,
    cfg: &TapestryConfig,
    source: &str,
    output: Option<&Path>,
    timeout: Option<u64>,
) -> Result<()> {
    let html = load_source(cfg, source, timeout)?;
    let extracted = extract_from_html(&html);
    if extracted.content.is_empty() {
        eprintln!("Warning: No content extracted");
    }

    let rendered = extracted.render();
    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            let title = if extracted.title.is_empty() {
                "Untitled"
            } else {
                extracted.title.as_str()
            };
            writeln!(out, "Extracted: {} ({} words)", title, extracted.word_count())?;
        }
        None => writeln!(out, "{rendered}")?,
    }
    Ok(())
}
