//! `tapestry vtt-to-text <path>`: caption file to plain transcript.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tapestry_core::vtt;

pub fn run_vtt_to_text(out: &mut impl Write, path: &Path, output: Option<&Path>) -> Result<()> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    let text = vtt::vtt_to_text(&vtt::read_caption_file(path)?);

    match output {
        Some(dest) => {
            fs::write(dest, &text)
                .with_context(|| format!("failed to write {}", dest.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let words = text.split_whitespace().count();
            writeln!(out, "Converted: {} -> {} ({} words)", name, dest.display(), words)?;
        }
        None => writeln!(out, "{text}")?,
    }
    Ok(())
}
