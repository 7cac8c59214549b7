//! WebVTT captions to plain text.
//!
//! Auto-generated captions repeat each line as it scrolls, so besides
//! stripping headers, timings, and markup the cleaner keeps only the first
//! occurrence of every line.

use anyhow::{Context, Result};
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const METADATA_PREFIXES: &[&str] = &["Kind:", "Language:", "NOTE", "STYLE", "REGION"];

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
/// Numeric (`12`) or UUID-style cue identifiers. A caption line made only
/// of hex digits and dashes (`bad`, `DEAD-BEEF`) is indistinguishable from
/// one and is dropped too.
static CUE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9a-f-]+$").expect("static regex"));

fn is_structural(line: &str) -> bool {
    line.starts_with("WEBVTT")
        || METADATA_PREFIXES.iter().any(|p| line.starts_with(p))
        || CUE_ID.is_match(line)
        || line.contains("-->")
}

/// Decodes character references (`&amp;`, `&#39;`, `&eacute;`, ...). Any `<`
/// left after tag stripping is kept as a literal.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let escaped = text.replace('<', "&lt;");
    Html::parse_fragment(&escaped)
        .root_element()
        .text()
        .collect()
}

/// Converts VTT caption content into deduplicated plain text, one caption
/// line per output line.
pub fn vtt_to_text(content: &str) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut lines: Vec<String> = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || is_structural(line) {
            continue;
        }

        let stripped = TAG.replace_all(line, "");
        let decoded = decode_entities(&stripped);
        let clean = decoded.trim();
        if clean.is_empty() {
            continue;
        }
        if seen.insert(clean.to_string()) {
            lines.push(clean.to_string());
        }
    }

    lines.join("\n")
}

/// Reads a caption file as UTF-8, falling back to Latin-1 when the bytes are
/// not valid UTF-8.
pub fn read_caption_file(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::debug!(path = %path.display(), "caption file is not UTF-8, decoding as Latin-1");
            Ok(e.into_bytes().iter().map(|&b| char::from(b)).collect())
        }
    }
}
