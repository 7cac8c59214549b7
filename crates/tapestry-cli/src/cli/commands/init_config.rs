//! `tapestry init-config`: write the default config file.

use anyhow::{bail, Result};
use std::io::Write;
use std::path::Path;
use tapestry_core::config;

pub fn run_init_config(out: &mut impl Write, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    config::write_default(path)?;
    writeln!(out, "Wrote default config to {}", path.display())?;
    Ok(())
}
